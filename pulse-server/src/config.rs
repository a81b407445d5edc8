//! Server configuration module.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use pulse_api::ApiConfig;
use pulse_api::config::EventStreamConfig;

/// Server configuration.
///
/// Loaded from a YAML file, with `PULSE_*` environment variables applied
/// on top.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: HttpConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Shutdown event stream settings.
    #[serde(default)]
    pub events: EventsConfig,

    /// Graceful shutdown settings.
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl ServerConfig {
    /// Loads configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e))?;
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Applies environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("PULSE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PULSE_SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(level) = std::env::var("PULSE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(secs) = std::env::var("PULSE_SHUTDOWN_TIMEOUT") {
            if let Ok(secs) = secs.parse() {
                self.shutdown.timeout_secs = secs;
            }
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() {
            return Err(ConfigError::Invalid("server.host cannot be empty".to_string()));
        }
        if self.events.keep_alive_secs == 0 {
            return Err(ConfigError::Invalid(
                "events.keep_alive_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the API layer configuration from the server settings.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            events: EventStreamConfig {
                keep_alive_secs: self.events.keep_alive_secs,
            },
            ..ApiConfig::default()
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Shutdown event stream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Keep-alive tick for open event streams, in seconds.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

/// Graceful shutdown settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// Timeout for graceful shutdown in seconds.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl ShutdownConfig {
    /// Returns the shutdown timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_keep_alive_secs() -> u64 {
    1
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read {0}: {1}")]
    Io(String, #[source] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
