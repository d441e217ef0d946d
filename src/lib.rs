//! Taskboard library
//!
//! A project/task management REST backend. Every resource route sits behind
//! an authentication gate that verifies AWS Cognito JWTs against the user
//! pool's published JWKS.
//!
//! # Request flow
//!
//! 1. Incoming request hits the authentication middleware.
//! 2. The bearer token's signing key is resolved from the (cached) JWKS.
//! 3. Signature, audience, issuer and expiry are verified.
//! 4. Verified claims travel with the request into the resource handlers.
//!
//! Projects and their nested tasks are stored as documents in a
//! SQLite-backed collection layer.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod store;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
