//! Application state for the API server.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::events::{EventBroker, ShutdownFlags};

use pulse_data::MetricsStore;

/// Shared application state.
pub struct AppState {
    /// API configuration
    pub config: ApiConfig,
    /// Storage backend
    pub store: Arc<dyn MetricsStore>,
    /// Shutdown-event broker
    pub broker: Arc<EventBroker>,
    /// Sticky per-aggregator shutdown flags (poll-based alternative to the
    /// event stream)
    pub shutdown_flags: ShutdownFlags,
    /// Server start time, for uptime reporting
    started_at: Instant,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(config: ApiConfig, store: Arc<dyn MetricsStore>) -> Self {
        Self {
            config,
            store,
            broker: Arc::new(EventBroker::new()),
            shutdown_flags: ShutdownFlags::new(),
            started_at: Instant::now(),
        }
    }

    /// Returns the time elapsed since the state was created.
    #[must_use]
    pub fn uptime(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("broker", &self.broker)
            .finish_non_exhaustive()
    }
}
