//! Login, new-password challenge and token verification routes.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::{AppState, message_response};
use crate::auth::{AuthOutcome, Claims};

/// `POST /login` body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username (required).
    pub username: Option<String>,
    /// Password (required).
    pub password: Option<String>,
}

/// `POST /respond-to-new-password-challenge` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Username (required).
    pub username: Option<String>,
    /// The new password to set (required).
    pub new_password: Option<String>,
    /// Opaque session from the login challenge (required).
    pub session: Option<String>,
}

/// `POST /login` — password authentication against the identity provider.
///
/// Answers with the provider's token bundle, a `NEW_PASSWORD_REQUIRED`
/// challenge carrying the session to echo back, or 400 with the provider's
/// message.
pub async fn login(State(state): State<Arc<AppState>>, Json(body): Json<LoginRequest>) -> Response {
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return message_response(StatusCode::BAD_REQUEST, "Username and password are required");
    };

    match state.idp.login(&username, &password).await {
        Ok(AuthOutcome::Challenge { session }) => {
            Json(json!({ "message": "NEW_PASSWORD_REQUIRED", "session": session }))
                .into_response()
        }
        Ok(AuthOutcome::Authenticated(result)) => Json(result).into_response(),
        Ok(AuthOutcome::Incomplete) => {
            message_response(StatusCode::BAD_REQUEST, "Authentication failed")
        }
        Err(e) => {
            warn!(username = %username, error = %e, "Login rejected");
            message_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

/// `POST /respond-to-new-password-challenge` — complete a forced password
/// change and receive the token bundle.
pub async fn respond_to_new_password_challenge(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChallengeRequest>,
) -> Response {
    let (Some(username), Some(new_password), Some(session)) =
        (body.username, body.new_password, body.session)
    else {
        return message_response(
            StatusCode::BAD_REQUEST,
            "Username, newPassword and session are required",
        );
    };

    match state
        .idp
        .respond_to_new_password_challenge(&username, &new_password, &session)
        .await
    {
        Ok(AuthOutcome::Authenticated(result)) => Json(result).into_response(),
        Ok(_) => message_response(StatusCode::BAD_REQUEST, "Failed to set new password"),
        Err(e) => {
            warn!(username = %username, error = %e, "Challenge response rejected");
            message_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

/// `GET /verify` — echo the verified claims back to the caller.
///
/// Reaching this handler at all means the authentication gate accepted the
/// token; the claims extension is attached by the gate.
pub async fn verify(Extension(claims): Extension<Claims>) -> Response {
    Json(json!({ "message": "Token is valid", "user": claims })).into_response()
}
