//! Main server implementation.
//!
//! Orchestrates the storage backend, the shutdown-event broker, and the
//! HTTP API, and drives graceful shutdown.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use pulse_api::{ApiServer, AppState};
use pulse_data::MemoryStore;

use crate::config::ServerConfig;
use crate::shutdown::{ShutdownController, setup_signal_handlers};
use crate::telemetry::init_logging;

/// Server lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Not yet initialized.
    Stopped,
    /// Initialized, not yet serving.
    Starting,
    /// Serving requests.
    Running,
    /// Draining before exit.
    ShuttingDown,
}

/// The Pulse metrics-collection server.
pub struct PulseServer {
    config: ServerConfig,
    state: Arc<RwLock<ServerState>>,
    shutdown: ShutdownController,
    store: Arc<MemoryStore>,
}

impl PulseServer {
    /// Creates a new server from validated configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(ServerState::Stopped)),
            shutdown: ShutdownController::new(),
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Returns the current lifecycle state.
    pub async fn state(&self) -> ServerState {
        *self.state.read().await
    }

    /// Returns the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> &ShutdownController {
        &self.shutdown
    }

    /// Initializes logging and prepares the server to run.
    pub async fn initialize(&mut self) -> Result<(), ServerError> {
        {
            let mut state = self.state.write().await;
            if *state != ServerState::Stopped {
                return Err(ServerError::InvalidState(
                    "Server must be stopped to initialize".to_string(),
                ));
            }
            *state = ServerState::Starting;
        }

        init_logging(&self.config.logging.level)?;
        info!(
            "Pulse server initialized (log level: {})",
            self.config.logging.level
        );
        Ok(())
    }

    /// Runs the server until a shutdown signal arrives.
    pub async fn run(&self) -> Result<(), ServerError> {
        {
            let mut state = self.state.write().await;
            if *state != ServerState::Starting {
                return Err(ServerError::InvalidState(
                    "Server must be initialized before running".to_string(),
                ));
            }
            *state = ServerState::Running;
        }

        let api_config = self.config.api_config();
        let api_state = Arc::new(AppState::new(api_config, self.store.clone()));
        let api_server = ApiServer::with_state(api_state.clone());

        let signal_ctrl = self.shutdown.clone();
        tokio::spawn(async move {
            setup_signal_handlers(signal_ctrl).await;
        });

        let shutdown = self.shutdown.clone();
        let shutdown_signal = async move {
            shutdown.wait_for_shutdown().await;
        };

        info!(
            "Pulse server running on {}:{}",
            self.config.server.host, self.config.server.port
        );

        api_server
            .run_with_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::Runtime(format!("API server error: {e}")))?;

        // Drain in a task and bound the wait by the configured timeout.
        let drain = tokio::spawn(Self::graceful_shutdown(
            self.state.clone(),
            api_state,
            self.shutdown.clone(),
        ));

        let timeout = self.config.shutdown.timeout();
        if self.shutdown.wait_for_completion(timeout).await {
            let _ = drain.await;
        } else {
            warn!("Graceful shutdown incomplete after {:?}, exiting", timeout);
            drain.abort();
        }
        Ok(())
    }

    /// Initiates shutdown from outside the signal path.
    pub fn shutdown(&self) {
        self.shutdown.initiate();
    }

    async fn graceful_shutdown(
        lifecycle: Arc<RwLock<ServerState>>,
        api_state: Arc<AppState>,
        shutdown: ShutdownController,
    ) {
        {
            let mut state = lifecycle.write().await;
            *state = ServerState::ShuttingDown;
        }

        info!("Performing graceful shutdown...");

        // Open event streams end when the HTTP server drops their
        // connections; their guards have already unregistered by the time
        // serve() returns. Anything left would indicate a leaked stream.
        if !api_state.broker.is_empty() {
            warn!("Event broker still has subscribers at shutdown");
        }

        {
            let mut state = lifecycle.write().await;
            *state = ServerState::Stopped;
        }

        shutdown.mark_complete();
        info!("Graceful shutdown complete");
    }
}

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A component failed to initialize.
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Operation attempted in the wrong lifecycle state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Failure while serving.
    #[error("Runtime error: {0}")]
    Runtime(String),
}
