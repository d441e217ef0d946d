//! Bearer token verification against the user pool's signing keys.

use jsonwebtoken::{
    Algorithm, DecodingKey, TokenData, Validation,
    errors::ErrorKind,
    jwk::{AlgorithmParameters, JwkSet},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::jwks::JwksCache;
use crate::config::CognitoConfig;

/// Error variants for token verification failures.
///
/// Each cause of rejection is a distinct variant; the authentication gate
/// collapses them all into one 401 while keeping the message for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token was presented.
    #[error("No token provided")]
    NoToken,

    /// The token could not be decoded or its header lacks a `kid`.
    #[error("invalid token header: {0}")]
    MalformedToken(String),

    /// The `kid` in the token header is not in the key set, even after a
    /// forced refresh.
    #[error("signing key not found in key set: {0}")]
    UnknownKey(String),

    /// The signature does not verify under the resolved key.
    #[error("token signature is invalid")]
    InvalidSignature,

    /// The `aud` claim does not match the configured client id.
    #[error("token audience mismatch")]
    AudienceMismatch,

    /// The `iss` claim does not match the user pool's issuer URL.
    #[error("token issuer mismatch")]
    IssuerMismatch,

    /// The token is past its `exp` claim.
    #[error("token has expired")]
    Expired,

    /// Any other JWT-level failure (unsupported algorithm, bad base64, ...).
    #[error("token verification failed: {0}")]
    Jwt(#[source] jsonwebtoken::errors::Error),

    /// Network or HTTP error while fetching the JWKS.
    #[error("JWKS fetch failed: {0}")]
    Jwks(#[from] reqwest::Error),
}

/// Verified token claims, attached to the request after authentication.
///
/// Standard claims are typed; everything else the pool puts into its tokens
/// rides along in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (opaque user id).
    pub sub: String,
    /// Audience — the app client id.
    pub aud: String,
    /// Issuer — the user pool URL.
    pub iss: String,
    /// Expiry (Unix timestamp).
    pub exp: u64,
    /// Issued-at (Unix timestamp).
    pub iat: u64,
    /// Cognito username.
    #[serde(rename = "cognito:username", default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Email address, when present in the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Remaining provider-specific claims (`token_use`, groups, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Token verifier — resolves signing keys via [`JwksCache`] and validates
/// signature, audience, issuer and expiry.
pub struct TokenVerifier {
    jwks: JwksCache,
    audience: String,
    issuer: String,
}

impl TokenVerifier {
    /// Create a verifier for the configured user pool.
    #[must_use]
    pub fn new(config: &CognitoConfig) -> Self {
        Self {
            jwks: JwksCache::new(config.jwks_uri(), config.jwks_cache_ttl),
            audience: config.client_id.clone(),
            issuer: config.issuer(),
        }
    }

    /// Verify a bearer token and return its claims.
    ///
    /// The header is decoded before any network call: a token without a
    /// usable header or `kid` is rejected without touching the key store.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] variant matching the first check that fails.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AuthError::MalformedToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::MalformedToken("missing kid".to_string()))?;

        let key = self.resolve_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        let data: TokenData<Claims> =
            jsonwebtoken::decode(token, &key, &validation).map_err(classify_jwt_error)?;

        debug!(sub = %data.claims.sub, "Token verified");
        Ok(data.claims)
    }

    /// Resolve a decoding key by `kid`, refreshing the JWKS once if absent.
    async fn resolve_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let jwks = self.jwks.get(false).await?;
        if let Some(key) = find_key_in_jwks(&jwks, kid) {
            return Ok(key);
        }

        // Unknown kid: the pool may have rotated its keys. Refresh once.
        debug!(kid = %kid, "Key not found in cached JWKS, refreshing");
        let jwks = self.jwks.get(true).await?;
        find_key_in_jwks(&jwks, kid).ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }
}

/// Map a `jsonwebtoken` failure onto the matching [`AuthError`] variant.
fn classify_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidAudience => AuthError::AudienceMismatch,
        ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Jwt(err),
    }
}

/// Find a JWK by `kid` in a `JwkSet` and convert it to a `DecodingKey`.
///
/// Cognito pools sign with RSA; other key types are not usable here.
fn find_key_in_jwks(jwks: &JwkSet, kid: &str) -> Option<DecodingKey> {
    for jwk in &jwks.keys {
        let jwk_kid = jwk.common.key_id.as_deref().unwrap_or("");
        if jwk_kid != kid {
            continue;
        }

        return match &jwk.algorithm {
            AlgorithmParameters::RSA(rsa) => {
                DecodingKey::from_rsa_components(&rsa.n, &rsa.e).ok()
            }
            _ => None,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classify_expired() {
        let err = jsonwebtoken::errors::Error::from(ErrorKind::ExpiredSignature);
        assert!(matches!(classify_jwt_error(err), AuthError::Expired));
    }

    #[test]
    fn classify_audience() {
        let err = jsonwebtoken::errors::Error::from(ErrorKind::InvalidAudience);
        assert!(matches!(classify_jwt_error(err), AuthError::AudienceMismatch));
    }

    #[test]
    fn classify_issuer() {
        let err = jsonwebtoken::errors::Error::from(ErrorKind::InvalidIssuer);
        assert!(matches!(classify_jwt_error(err), AuthError::IssuerMismatch));
    }

    #[test]
    fn classify_signature() {
        let err = jsonwebtoken::errors::Error::from(ErrorKind::InvalidSignature);
        assert!(matches!(classify_jwt_error(err), AuthError::InvalidSignature));
    }

    #[test]
    fn claims_roundtrip_preserves_provider_claims() {
        let json = serde_json::json!({
            "sub": "user-1",
            "aud": "client-1",
            "iss": "https://cognito-idp.eu-central-1.amazonaws.com/eu-central-1_X",
            "exp": 4102444800u64,
            "iat": 1700000000u64,
            "cognito:username": "alice",
            "email": "alice@example.com",
            "token_use": "id",
        });

        let claims: Claims = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(claims.username.as_deref(), Some("alice"));
        assert_eq!(claims.extra["token_use"], "id");

        let back = serde_json::to_value(&claims).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn find_key_returns_none_for_unknown_kid() {
        let jwks: JwkSet = serde_json::from_str(r#"{"keys":[]}"#).unwrap();
        assert!(find_key_in_jwks(&jwks, "nope").is_none());
    }
}
