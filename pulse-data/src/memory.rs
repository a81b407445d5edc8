//! In-memory storage backend.
//!
//! Holds all records in concurrent maps. Suitable for a single server
//! process; nothing survives a restart.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::model::{Aggregator, Metric, Snapshot};
use crate::store::{MetricsStore, StoreError, StoreResult};

/// In-memory [`MetricsStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Aggregators by UUID
    aggregators: DashMap<String, Aggregator>,
    /// Metrics by UUID
    metrics: DashMap<String, Metric>,
    /// Snapshots grouped by metric UUID
    snapshots: DashMap<String, Vec<Snapshot>>,
    /// Serializes uniqueness checks during registration
    registration: Mutex<()>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered aggregators.
    #[must_use]
    pub fn aggregator_count(&self) -> usize {
        self.aggregators.len()
    }

    /// Returns the number of registered metrics.
    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.metrics.len()
    }
}

#[async_trait::async_trait]
impl MetricsStore for MemoryStore {
    async fn register_aggregator(&self, name: &str) -> StoreResult<Aggregator> {
        let _guard = self.registration.lock();

        if self.aggregators.iter().any(|a| a.name == name) {
            return Err(StoreError::DuplicateAggregator(name.to_string()));
        }

        let aggregator = Aggregator::new(name);
        self.aggregators
            .insert(aggregator.uuid.clone(), aggregator.clone());
        debug!(uuid = %aggregator.uuid, name, "aggregator registered");
        Ok(aggregator)
    }

    async fn aggregator(&self, uuid: &str) -> StoreResult<Aggregator> {
        self.aggregators
            .get(uuid)
            .map(|entry| entry.clone())
            .ok_or_else(|| StoreError::AggregatorNotFound(uuid.to_string()))
    }

    async fn aggregator_exists(&self, uuid: &str) -> bool {
        self.aggregators.contains_key(uuid)
    }

    async fn list_aggregators(&self) -> Vec<Aggregator> {
        let mut aggregators: Vec<Aggregator> =
            self.aggregators.iter().map(|entry| entry.clone()).collect();
        aggregators.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        aggregators
    }

    async fn touch_aggregator_activity(&self, uuid: &str) -> StoreResult<()> {
        let mut entry = self
            .aggregators
            .get_mut(uuid)
            .ok_or_else(|| StoreError::AggregatorNotFound(uuid.to_string()))?;
        entry.last_active = Utc::now();
        Ok(())
    }

    async fn register_metric(
        &self,
        aggregator_uuid: &str,
        name: &str,
        unit: &str,
    ) -> StoreResult<Metric> {
        let _guard = self.registration.lock();

        if !self.aggregators.contains_key(aggregator_uuid) {
            return Err(StoreError::AggregatorNotFound(aggregator_uuid.to_string()));
        }

        let duplicate = self
            .metrics
            .iter()
            .any(|m| m.aggregator_uuid == aggregator_uuid && m.name == name);
        if duplicate {
            return Err(StoreError::DuplicateMetric(name.to_string()));
        }

        let metric = Metric::new(aggregator_uuid, name, unit);
        self.metrics.insert(metric.uuid.clone(), metric.clone());
        debug!(uuid = %metric.uuid, aggregator = aggregator_uuid, name, "metric registered");
        Ok(metric)
    }

    async fn metric(&self, uuid: &str) -> StoreResult<Metric> {
        self.metrics
            .get(uuid)
            .map(|entry| entry.clone())
            .ok_or_else(|| StoreError::MetricNotFound(uuid.to_string()))
    }

    async fn list_metrics(&self) -> Vec<Metric> {
        let mut metrics: Vec<Metric> = self.metrics.iter().map(|entry| entry.clone()).collect();
        metrics.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        metrics
    }

    async fn record_snapshot(
        &self,
        metric_uuid: &str,
        value: f64,
        timestamp: DateTime<Utc>,
        utc_offset_minutes: i32,
    ) -> StoreResult<Snapshot> {
        let aggregator_uuid = {
            let metric = self
                .metrics
                .get(metric_uuid)
                .ok_or_else(|| StoreError::MetricNotFound(metric_uuid.to_string()))?;
            metric.aggregator_uuid.clone()
        };

        let snapshot = Snapshot::new(metric_uuid, value, timestamp, utc_offset_minutes);
        self.snapshots
            .entry(metric_uuid.to_string())
            .or_default()
            .push(snapshot.clone());

        // A metric's aggregator may have been removed only if the whole
        // store was torn down, so a miss here is not an error.
        let _ = self.touch_aggregator_activity(&aggregator_uuid).await;

        Ok(snapshot)
    }

    async fn snapshots(
        &self,
        metric_uuid: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> StoreResult<Vec<Snapshot>> {
        if !self.metrics.contains_key(metric_uuid) {
            return Err(StoreError::MetricNotFound(metric_uuid.to_string()));
        }

        let mut result: Vec<Snapshot> = self
            .snapshots
            .get(metric_uuid)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|s| start.is_none_or(|t| s.timestamp >= t))
                    .filter(|s| end.is_none_or(|t| s.timestamp <= t))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        result.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(result)
    }

    async fn latest_snapshots(&self) -> Vec<Snapshot> {
        let mut latest: Vec<Snapshot> = self
            .snapshots
            .iter()
            .filter_map(|entry| {
                entry
                    .iter()
                    .max_by(|a, b| a.timestamp.cmp(&b.timestamp))
                    .cloned()
            })
            .collect();
        latest.sort_by(|a, b| a.metric_uuid.cmp(&b.metric_uuid));
        latest
    }
}
