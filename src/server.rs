//! HTTP server assembly and lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::api::{AppState, create_router};
use crate::auth::{AuthGate, CognitoClient, TokenVerifier};
use crate::config::Config;
use crate::store::Store;
use crate::{Error, Result};

/// Taskboard server
pub struct Server {
    /// Configuration
    config: Config,
}

impl Server {
    /// Create a server from validated configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the server until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the bind address is invalid, the store cannot be
    /// opened, or serving fails.
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
            self.config.server.port,
        );

        let store = Store::connect(
            &self.config.database.url,
            self.config.database.max_connections,
        )
        .await?;

        let idp = Arc::new(CognitoClient::new(&self.config.cognito));
        let verifier = Arc::new(TokenVerifier::new(&self.config.cognito));
        let gate = Arc::new(AuthGate::new(verifier));

        let state = Arc::new(AppState { store, idp });
        let app = create_router(state, gate);

        let listener = TcpListener::bind(addr).await?;

        info!(host = %self.config.server.host, port = self.config.server.port, "Listening");
        info!(issuer = %self.config.cognito.issuer(), "Verifying tokens against user pool");
        if self.config.cognito.jwks_uri.is_some() || self.config.cognito.endpoint.is_some() {
            warn!("Identity provider endpoint overrides are active");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        info!("Server stopped");
        Ok(())
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
