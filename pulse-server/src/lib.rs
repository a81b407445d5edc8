//! # Pulse Server
//!
//! Main entry point for the Pulse metrics-collection server.
//!
//! This crate provides:
//! - Configuration loading and validation
//! - Logging initialization
//! - API server startup over the in-memory store
//! - Graceful shutdown handling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod server;
pub mod shutdown;
pub mod telemetry;

pub use config::ServerConfig;
pub use server::{PulseServer, ServerError};
pub use shutdown::ShutdownController;
