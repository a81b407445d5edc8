//! Logging initialization.

use tracing_subscriber::EnvFilter;

use crate::server::ServerError;

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(level: &str) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| ServerError::Initialization(format!("Failed to initialize logging: {e}")))
}
