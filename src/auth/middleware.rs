//! Authentication gate — the single enforcement point for protected routes.
//!
//! Applied to the whole router, with a fixed public-path list, so a newly
//! added route is protected by default and cannot dodge the gate through
//! route ordering.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, warn};

use super::verifier::{AuthError, TokenVerifier};

/// Paths reachable without a token: liveness plus the two credential
/// exchange routes (they *are* the authentication step).
pub const PUBLIC_PATHS: &[&str] = &["/health", "/login", "/respond-to-new-password-challenge"];

/// Gate state: the verifier plus the public-path list.
pub struct AuthGate {
    verifier: Arc<TokenVerifier>,
    public_paths: Vec<String>,
}

impl AuthGate {
    /// Create a gate around `verifier` with the default public paths.
    #[must_use]
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self {
            verifier,
            public_paths: PUBLIC_PATHS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Check if a path is public (bypasses the gate).
    #[must_use]
    pub fn is_public_path(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| path == p)
    }
}

/// Authentication middleware.
///
/// Missing bearer token → 401 without invoking the verifier. Any verifier
/// failure → 401 carrying the cause's message. Success → verified
/// [`Claims`](super::Claims) inserted into the request extensions.
pub async fn authenticate(
    State(gate): State<Arc<AuthGate>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if gate.is_public_path(path) {
        debug!(path = %path, "Public path, skipping auth");
        return next.run(request).await;
    }

    // Extract token from Authorization header
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        })
        .map(String::from);

    let Some(token) = token else {
        warn!(path = %path, "Missing bearer token");
        return no_token_response();
    };

    match gate.verifier.verify(&token).await {
        Ok(claims) => {
            debug!(path = %path, sub = %claims.sub, "Authenticated request");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            warn!(path = %path, error = %e, "Token rejected");
            invalid_token_response(&e.to_string())
        }
    }
}

/// 401 for requests that present no token at all.
fn no_token_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [("WWW-Authenticate", "Bearer")],
        Json(json!({ "message": AuthError::NoToken.to_string() })),
    )
        .into_response()
}

/// 401 for requests whose token failed verification.
fn invalid_token_response(cause: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [("WWW-Authenticate", "Bearer")],
        Json(json!({ "message": "Invalid token", "error": cause })),
    )
        .into_response()
}
