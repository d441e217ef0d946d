//! Shared test plumbing: fixture tokens, a stub identity provider, and a
//! helper that boots the full app on an ephemeral port.
//!
//! The JWT fixtures were signed offline with a throwaway RSA key pair; the
//! matching public keys live in `tests/fixtures/jwks*.json`. `token_valid`
//! expires far in the future, `token_expired` far in the past.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use taskboard::api::{AppState, create_router};
use taskboard::auth::{AuthGate, CognitoClient, TokenVerifier};
use taskboard::config::CognitoConfig;
use taskboard::store::Store;

pub const JWKS: &str = include_str!("../fixtures/jwks.json");
pub const JWKS_ROTATED: &str = include_str!("../fixtures/jwks_rotated.json");

pub const TOKEN_VALID: &str = include_str!("../fixtures/token_valid.txt");
pub const TOKEN_EXPIRED: &str = include_str!("../fixtures/token_expired.txt");
pub const TOKEN_WRONG_AUDIENCE: &str = include_str!("../fixtures/token_wrong_audience.txt");
pub const TOKEN_WRONG_ISSUER: &str = include_str!("../fixtures/token_wrong_issuer.txt");
pub const TOKEN_UNKNOWN_KID: &str = include_str!("../fixtures/token_unknown_kid.txt");
pub const TOKEN_NO_KID: &str = include_str!("../fixtures/token_no_kid.txt");
pub const TOKEN_ROTATED_KEY: &str = include_str!("../fixtures/token_rotated_key.txt");
pub const TOKEN_TAMPERED: &str = include_str!("../fixtures/token_tampered.txt");

/// Subject baked into every fixture token.
pub const FIXTURE_SUB: &str = "5f3f2c1a-aaaa-bbbb-cccc-1234567890ab";

pub const REGION: &str = "eu-central-1";
pub const USER_POOL_ID: &str = "eu-central-1_Fixture1";
pub const CLIENT_ID: &str = "fixture-client-id";
pub const CLIENT_SECRET: &str = "fixture-client-secret";

/// Secret hash for `alice` under the fixture client, precomputed offline.
pub const ALICE_SECRET_HASH: &str = "jboXPy4S2VogfEkTxS+br8C7Elv/i6Rlz/MSjbdOKGI=";

/// Cognito configuration pointing at stub endpoints.
pub fn cognito_config(jwks_uri: &str, endpoint: &str) -> CognitoConfig {
    CognitoConfig {
        region: REGION.to_string(),
        user_pool_id: USER_POOL_ID.to_string(),
        client_id: CLIENT_ID.to_string(),
        client_secret: CLIENT_SECRET.to_string(),
        endpoint: Some(endpoint.to_string()),
        jwks_uri: Some(jwks_uri.to_string()),
        jwks_cache_ttl: Duration::from_secs(3600),
    }
}

/// Boot the whole app (in-memory store, stubbed provider endpoints) on an
/// ephemeral port. Returns the base URL.
pub async fn spawn_app(jwks_uri: &str, idp_endpoint: &str) -> String {
    let cognito = cognito_config(jwks_uri, idp_endpoint);

    let store = Store::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory store");
    let idp = Arc::new(CognitoClient::new(&cognito));
    let verifier = Arc::new(TokenVerifier::new(&cognito));
    let gate = Arc::new(AuthGate::new(verifier));

    let app = create_router(Arc::new(AppState { store, idp }), gate);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    format!("http://{addr}")
}
