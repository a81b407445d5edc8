//! API configuration types.
//!
//! This module provides configuration for the API server including:
//! - Server binding address and port
//! - Event stream (SSE) settings
//! - CORS settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Event stream configuration
    #[serde(default)]
    pub events: EventStreamConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Enable request logging
    #[serde(default = "default_true")]
    pub enable_request_logging: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            events: EventStreamConfig::default(),
            cors: CorsConfig::default(),
            enable_request_logging: true,
        }
    }
}

impl ApiConfig {
    /// Returns the server bind address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Event stream (SSE) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventStreamConfig {
    /// Keep-alive tick interval in seconds.
    ///
    /// Bounds both the keep-alive cadence and the worst-case latency for
    /// detecting a broker-side unregister.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl Default for EventStreamConfig {
    fn default() -> Self {
        Self {
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

impl EventStreamConfig {
    /// Returns the keep-alive tick as a duration.
    #[must_use]
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Enable CORS
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Allowed origins (empty means all origins)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec![],
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_keep_alive_secs() -> u64 {
    1
}

fn default_true() -> bool {
    true
}
