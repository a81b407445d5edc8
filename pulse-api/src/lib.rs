//! # Pulse API
//!
//! HTTP API for the Pulse metrics-collection server.
//!
//! This crate provides:
//! - REST endpoints for aggregator, metric, and snapshot management
//! - A server-push event stream that delivers shutdown commands to
//!   connected aggregators
//! - The event broker that fans a shutdown command out to every open
//!   stream for the addressed aggregator
//! - Request-id middleware and CORS configuration
//!
//! # Endpoints
//!
//! - `POST /register_aggregator` - register an aggregator
//! - `POST /register_metric` - register a metric under an aggregator
//! - `POST /snapshot` - submit a value snapshot
//! - `GET /aggregators`, `GET /metrics` - listings
//! - `GET /snapshots`, `GET /latest_snapshots` - snapshot queries
//! - `POST /shutdown_aggregator` - issue a shutdown command (best-effort)
//! - `GET /shutdown_events/{aggregator_uuid}` - SSE shutdown stream
//! - `GET /shutdown_status/{aggregator_uuid}` - poll-based shutdown flag
//! - `GET /health` - health check
//!
//! Shutdown delivery is best-effort: the command reaches only streams open
//! at publish time, and the operator is told the command was issued, not
//! that it was received.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ApiConfig;
pub use error::ApiError;
pub use events::{EventBroker, EventMessage, SubscriberChannel};
pub use server::ApiServer;
pub use state::AppState;
