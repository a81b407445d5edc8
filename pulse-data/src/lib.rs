//! # Pulse Data
//!
//! Data model and storage for the Pulse metrics-collection server.
//!
//! This crate provides:
//! - Record types for aggregators, metrics, and value snapshots
//! - The [`MetricsStore`] trait for pluggable storage backends
//! - An in-memory backend suitable for a single server process
//!
//! The API layer consumes storage exclusively through the trait, so a
//! persistent backend can be introduced without touching the handlers.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod memory;
pub mod model;
pub mod store;

pub use memory::MemoryStore;
pub use model::{Aggregator, Metric, Snapshot};
pub use store::{MetricsStore, StoreError};
