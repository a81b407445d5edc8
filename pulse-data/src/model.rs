//! Record types for aggregators, metrics, and snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered aggregator process.
///
/// An aggregator is a remote client that registers itself once, registers
/// its metrics, and periodically submits value snapshots. It is also the
/// unit addressed by shutdown commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregator {
    /// Unique identifier (UUID v4, assigned at registration)
    pub uuid: String,
    /// Human-readable name, unique across all aggregators
    pub name: String,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
    /// Last time this aggregator submitted a snapshot
    pub last_active: DateTime<Utc>,
}

impl Aggregator {
    /// Creates a new aggregator record with a fresh UUID.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: now,
            last_active: now,
        }
    }
}

/// A named metric owned by one aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    /// Unique identifier (UUID v4, assigned at registration)
    pub uuid: String,
    /// Owning aggregator's UUID
    pub aggregator_uuid: String,
    /// Metric name, unique within the owning aggregator
    pub name: String,
    /// Unit of measurement (free-form, e.g. "ms" or "bytes")
    pub unit: String,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

impl Metric {
    /// Creates a new metric record with a fresh UUID.
    #[must_use]
    pub fn new(
        aggregator_uuid: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            aggregator_uuid: aggregator_uuid.into(),
            name: name.into(),
            unit: unit.into(),
            created_at: Utc::now(),
        }
    }
}

/// A single timestamped value submitted for a metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Owning metric's UUID
    pub metric_uuid: String,
    /// Measured value
    pub value: f64,
    /// Measurement timestamp (UTC)
    pub timestamp: DateTime<Utc>,
    /// Client timezone offset in minutes at measurement time
    pub utc_offset_minutes: i32,
    /// Ingestion timestamp
    pub created_at: DateTime<Utc>,
}

impl Snapshot {
    /// Creates a new snapshot record.
    #[must_use]
    pub fn new(
        metric_uuid: impl Into<String>,
        value: f64,
        timestamp: DateTime<Utc>,
        utc_offset_minutes: i32,
    ) -> Self {
        Self {
            metric_uuid: metric_uuid.into(),
            value,
            timestamp,
            utc_offset_minutes,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregator_new_assigns_uuid() {
        let a = Aggregator::new("node-1");
        let b = Aggregator::new("node-2");

        assert_ne!(a.uuid, b.uuid);
        assert!(Uuid::parse_str(&a.uuid).is_ok());
        assert_eq!(a.name, "node-1");
    }

    #[test]
    fn test_metric_new_links_aggregator() {
        let aggregator = Aggregator::new("node-1");
        let metric = Metric::new(&aggregator.uuid, "cpu_load", "percent");

        assert_eq!(metric.aggregator_uuid, aggregator.uuid);
        assert_eq!(metric.unit, "percent");
    }

    #[test]
    fn test_snapshot_serializes_timestamp_as_iso8601() {
        let timestamp = "2026-08-30T12:00:00Z".parse().unwrap();
        let snapshot = Snapshot::new("metric-uuid", 42.5, timestamp, -120);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["value"], 42.5);
        assert_eq!(json["utc_offset_minutes"], -120);
        assert!(
            json["timestamp"]
                .as_str()
                .unwrap()
                .starts_with("2026-08-30T12:00:00")
        );
    }
}
