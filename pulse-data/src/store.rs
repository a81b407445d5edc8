//! Storage interface for aggregator, metric, and snapshot records.
//!
//! The [`MetricsStore`] trait is the seam between the HTTP layer and
//! whatever holds the data. The server ships with the in-memory backend
//! from [`crate::memory`]; persistent backends implement the same trait.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Aggregator, Metric, Snapshot};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No aggregator with the given UUID exists.
    #[error("Aggregator with UUID \"{0}\" not found")]
    AggregatorNotFound(String),

    /// No metric with the given UUID exists.
    #[error("Metric with UUID \"{0}\" not found")]
    MetricNotFound(String),

    /// An aggregator with the same name is already registered.
    #[error("Aggregator with name \"{0}\" already exists")]
    DuplicateAggregator(String),

    /// The owning aggregator already has a metric with this name.
    #[error("Metric with name \"{0}\" already exists for this aggregator")]
    DuplicateMetric(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage backend for the metrics-collection server.
#[async_trait::async_trait]
pub trait MetricsStore: Send + Sync {
    /// Registers a new aggregator.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateAggregator`] if the name is taken.
    async fn register_aggregator(&self, name: &str) -> StoreResult<Aggregator>;

    /// Looks up an aggregator by UUID.
    async fn aggregator(&self, uuid: &str) -> StoreResult<Aggregator>;

    /// Returns whether an aggregator with the given UUID exists.
    async fn aggregator_exists(&self, uuid: &str) -> bool;

    /// Returns all registered aggregators.
    async fn list_aggregators(&self) -> Vec<Aggregator>;

    /// Bumps an aggregator's `last_active` timestamp.
    async fn touch_aggregator_activity(&self, uuid: &str) -> StoreResult<()>;

    /// Registers a new metric under an aggregator.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AggregatorNotFound`] for an unknown owner and
    /// [`StoreError::DuplicateMetric`] if the aggregator already has a
    /// metric with this name.
    async fn register_metric(
        &self,
        aggregator_uuid: &str,
        name: &str,
        unit: &str,
    ) -> StoreResult<Metric>;

    /// Looks up a metric by UUID.
    async fn metric(&self, uuid: &str) -> StoreResult<Metric>;

    /// Returns all registered metrics.
    async fn list_metrics(&self) -> Vec<Metric>;

    /// Records a snapshot for a metric and touches the owning aggregator's
    /// activity timestamp.
    async fn record_snapshot(
        &self,
        metric_uuid: &str,
        value: f64,
        timestamp: DateTime<Utc>,
        utc_offset_minutes: i32,
    ) -> StoreResult<Snapshot>;

    /// Returns a metric's snapshots inside an optional time range, in
    /// ascending timestamp order.
    async fn snapshots(
        &self,
        metric_uuid: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<Snapshot>>;

    /// Returns the newest snapshot for every metric that has one.
    async fn latest_snapshots(&self) -> Vec<Snapshot>;
}
