//! Credential exchange against the Cognito Identity Provider API.
//!
//! Both operations are single JSON POSTs to the regional endpoint with an
//! `X-Amz-Target` header selecting the action — no request signing is
//! required for app-client password flows. Provider rejections and transport
//! failures propagate unmodified; the route handler decides the HTTP status.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::secret_hash::secret_hash;
use crate::config::CognitoConfig;

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_INITIATE_AUTH: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const TARGET_RESPOND_TO_CHALLENGE: &str =
    "AWSCognitoIdentityProviderService.RespondToAuthChallenge";

/// Error variants for credential-exchange failures.
#[derive(Debug, thiserror::Error)]
pub enum IdpError {
    /// The provider rejected the call (invalid credentials, throttling, ...).
    /// Displays as the provider's own message so callers can forward it.
    #[error("{message}")]
    Provider {
        /// Provider error type (e.g. `NotAuthorizedException`).
        type_name: String,
        /// Provider error message.
        message: String,
    },

    /// Network or HTTP error reaching the provider.
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Token bundle issued on full authentication success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthenticationResult {
    /// Access token (JWT).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Seconds until the access token expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Identity token (JWT).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Refresh token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token type, normally `Bearer`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Outcome of a credential-exchange call.
///
/// The provider answers password flows in one of three shapes; modeling them
/// as a tagged variant keeps "challenge" and "tokens" from sharing one struct
/// of optional fields.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// The user must set a new password before tokens are issued. The opaque
    /// session string must be echoed back on the follow-up call.
    Challenge {
        /// Opaque provider session, forwarded verbatim.
        session: String,
    },
    /// Full success with a token bundle.
    Authenticated(AuthenticationResult),
    /// The provider returned neither a recognized challenge nor tokens.
    Incomplete,
}

/// Raw provider response for both password flows.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FlowResponse {
    challenge_name: Option<String>,
    session: Option<String>,
    authentication_result: Option<AuthenticationResult>,
}

/// Provider error body (`{ "__type": ..., "message": ... }`).
#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(rename = "__type")]
    type_name: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Client for the two Cognito password flows the API exposes.
pub struct CognitoClient {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
    client_secret: String,
}

impl CognitoClient {
    /// Create a client for the configured user pool.
    #[must_use]
    pub fn new(config: &CognitoConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// `InitiateAuth` with the `USER_PASSWORD_AUTH` flow.
    ///
    /// # Errors
    ///
    /// Returns [`IdpError`] on provider rejection or transport failure; both
    /// propagate to the caller unmodified.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthOutcome, IdpError> {
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": {
                "USERNAME": username,
                "PASSWORD": password,
                "SECRET_HASH": secret_hash(username, &self.client_id, &self.client_secret),
            },
        });

        self.call(TARGET_INITIATE_AUTH, &body).await
    }

    /// `RespondToAuthChallenge` for the `NEW_PASSWORD_REQUIRED` challenge.
    ///
    /// The secret hash is recomputed for the same username — it is bound to
    /// the username and client, not to the session.
    ///
    /// # Errors
    ///
    /// Returns [`IdpError`] on provider rejection or transport failure.
    pub async fn respond_to_new_password_challenge(
        &self,
        username: &str,
        new_password: &str,
        session: &str,
    ) -> Result<AuthOutcome, IdpError> {
        let body = json!({
            "ChallengeName": "NEW_PASSWORD_REQUIRED",
            "ClientId": self.client_id,
            "ChallengeResponses": {
                "USERNAME": username,
                "NEW_PASSWORD": new_password,
                "SECRET_HASH": secret_hash(username, &self.client_id, &self.client_secret),
            },
            "Session": session,
        });

        self.call(TARGET_RESPOND_TO_CHALLENGE, &body).await
    }

    async fn call(
        &self,
        target: &str,
        body: &serde_json::Value,
    ) -> Result<AuthOutcome, IdpError> {
        debug!(target = %target, "Calling identity provider");

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", target)
            .body(body.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            let parsed: ProviderError = serde_json::from_str(&text).unwrap_or(ProviderError {
                type_name: None,
                message: None,
            });
            return Err(IdpError::Provider {
                type_name: parsed.type_name.unwrap_or_else(|| "UnknownError".to_string()),
                message: parsed.message.unwrap_or(text),
            });
        }

        let flow: FlowResponse = response.json().await?;
        Ok(classify(flow))
    }
}

/// Map a raw provider response onto the tagged outcome.
fn classify(flow: FlowResponse) -> AuthOutcome {
    match (flow.challenge_name.as_deref(), flow.session) {
        (Some("NEW_PASSWORD_REQUIRED"), Some(session)) => AuthOutcome::Challenge { session },
        _ => match flow.authentication_result {
            Some(result) => AuthOutcome::Authenticated(result),
            None => AuthOutcome::Incomplete,
        },
    }
}
