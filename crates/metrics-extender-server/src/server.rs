use crate::error::{Result, ServerError};
use crate::handlers::*;
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Extender server configuration
#[derive(Clone)]
pub struct Config {
    /// Address to listen on
    pub listen_addr: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8001)),
        }
    }
}

/// Extender HTTP server
pub struct ApiServer {
    config: Config,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new extender server
    pub fn new(config: Config, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        Router::new()
            // Health checks
            .route("/healthz", get(healthz))
            .route("/stats", get(stats))
            // Extender verbs
            .route("/scheduler/filter", post(filter))
            .route("/scheduler/prioritize", post(prioritize))
            .route("/scheduler/preemption", post(preempt))
            .route("/scheduler/bind", post(bind))
            // Add tracing and state
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server until `token` is cancelled
    ///
    /// In-flight requests are allowed to finish after cancellation.
    pub async fn run(self, token: CancellationToken) -> Result<()> {
        let app = self.build_router();
        let addr = self.config.listen_addr;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::BindFailed { addr, source })?;

        info!("Scheduler extender listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
            .map_err(ServerError::ServeFailed)?;

        info!("Scheduler extender stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn healthz() -> &'static str {
    "ok"
}
