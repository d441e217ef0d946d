//! HTTP API — router assembly and shared handler plumbing.
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | `GET`  | `/health` | public |
//! | `POST` | `/login` | public |
//! | `POST` | `/respond-to-new-password-challenge` | public |
//! | `GET`  | `/verify` | bearer |
//! | `GET`/`POST` | `/projects` | bearer |
//! | `PUT`/`DELETE` | `/projects/{id}` | bearer |
//! | `GET`/`POST` | `/projects/{projectId}/tasks` | bearer |
//! | `PUT`/`DELETE` | `/projects/{projectId}/tasks/{taskId}` | bearer |

pub mod auth_routes;
pub mod projects;
pub mod tasks;

use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::auth::{AuthGate, CognitoClient, authenticate};
use crate::store::Store;

/// Shared application state
pub struct AppState {
    /// Document store handle
    pub store: Store,
    /// Credential exchange client
    pub idp: Arc<CognitoClient>,
}

/// Create the router
pub fn create_router(state: Arc<AppState>, gate: Arc<AuthGate>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/login", post(auth_routes::login))
        .route(
            "/respond-to-new-password-challenge",
            post(auth_routes::respond_to_new_password_challenge),
        )
        .route("/verify", get(auth_routes::verify))
        .route("/projects", get(projects::list).post(projects::create))
        .route(
            "/projects/{id}",
            put(projects::update).delete(projects::remove),
        )
        .route(
            "/projects/{project_id}/tasks",
            get(tasks::list).post(tasks::create),
        )
        .route(
            "/projects/{project_id}/tasks/{task_id}",
            put(tasks::update).delete(tasks::remove),
        )
        // Authentication middleware (applied before other layers)
        .layer(middleware::from_fn_with_state(gate, authenticate))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - liveness probe
async fn health_handler() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

/// A `{ "message": ... }` body with the given status.
pub(crate) fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// A 500 `{ "message": ..., "error": ... }` body for store failures.
pub(crate) fn store_error(message: &str, err: &crate::Error) -> Response {
    tracing::error!(error = %err, "{message}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": message, "error": err.to_string() })),
    )
        .into_response()
}
