//! API request handlers.

pub mod aggregators;
pub mod health;
pub mod metrics;
pub mod shutdown;
pub mod snapshots;
