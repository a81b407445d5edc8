//! API server implementation.
//!
//! This module provides the main API server that handles HTTP requests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::middleware::RequestIdLayer;
use crate::routes::create_router;
use crate::state::AppState;

use pulse_data::MetricsStore;

/// API server.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server over the given storage backend.
    #[must_use]
    pub fn new(config: ApiConfig, store: Arc<dyn MetricsStore>) -> Self {
        let state = Arc::new(AppState::new(config, store));
        Self { state }
    }

    /// Creates a new API server with existing state.
    #[must_use]
    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Runs the API server until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> Result<(), ApiError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config.bind_address();
        let enable_request_logging = self.state.config.enable_request_logging;

        let mut app = create_router(self.state.clone()).layer(RequestIdLayer::new());
        if enable_request_logging {
            app = app.layer(TraceLayer::new_for_http());
        }

        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| ApiError::Internal(format!("Invalid bind address {addr}: {e}")))?;

        let listener = TcpListener::bind(socket_addr)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to bind {socket_addr}: {e}")))?;

        info!("API server listening on {socket_addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ApiError::Internal(format!("Server error: {e}")))?;

        info!("API server stopped");
        Ok(())
    }
}
