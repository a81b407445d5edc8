//! Snapshot submission and query handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use pulse_data::Snapshot;

/// Submit snapshot request.
#[derive(Debug, Deserialize)]
pub struct SubmitSnapshotRequest {
    /// Owning metric UUID (required)
    #[serde(default)]
    pub metric_uuid: Option<String>,
    /// Measured value (required)
    #[serde(default)]
    pub value: Option<f64>,
    /// Measurement timestamp, ISO-8601 UTC (required)
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Client timezone offset in minutes (required)
    #[serde(default)]
    pub offset: Option<i32>,
}

/// Snapshot query parameters.
#[derive(Debug, Deserialize)]
pub struct SnapshotsQuery {
    /// Metric UUID to query (required)
    #[serde(default)]
    pub metric_uuid: Option<String>,
    /// Inclusive range start, ISO-8601 UTC
    #[serde(default)]
    pub start: Option<String>,
    /// Inclusive range end, ISO-8601 UTC
    #[serde(default)]
    pub end: Option<String>,
}

/// Snapshot list item.
#[derive(Debug, Serialize)]
pub struct SnapshotSummary {
    /// Measured value
    pub value: f64,
    /// Measurement timestamp
    pub timestamp: DateTime<Utc>,
    /// Client timezone offset in minutes
    pub offset: i32,
}

impl From<Snapshot> for SnapshotSummary {
    fn from(s: Snapshot) -> Self {
        Self {
            value: s.value,
            timestamp: s.timestamp,
            offset: s.utc_offset_minutes,
        }
    }
}

/// Latest-snapshot list item, tagged with its metric.
#[derive(Debug, Serialize)]
pub struct LatestSnapshot {
    /// Owning metric UUID
    pub metric_uuid: String,
    /// Measured value
    pub value: f64,
    /// Measurement timestamp
    pub timestamp: DateTime<Utc>,
    /// Client timezone offset in minutes
    pub offset: i32,
}

impl From<Snapshot> for LatestSnapshot {
    fn from(s: Snapshot) -> Self {
        Self {
            metric_uuid: s.metric_uuid,
            value: s.value,
            timestamp: s.timestamp,
            offset: s.utc_offset_minutes,
        }
    }
}

fn parse_timestamp(value: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            ApiError::BadRequest("Invalid timestamp format. Use ISO8601 UTC format.".to_string())
        })
}

/// Submit a value snapshot for a metric.
///
/// POST /snapshot
pub async fn submit_snapshot(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitSnapshotRequest>,
) -> ApiResult<StatusCode> {
    let (Some(metric_uuid), Some(value), Some(timestamp), Some(offset)) = (
        request.metric_uuid,
        request.value,
        request.timestamp,
        request.offset,
    ) else {
        return Err(ApiError::BadRequest(
            "Metric UUID, value, timestamp, and offset are required".to_string(),
        ));
    };

    let timestamp = parse_timestamp(&timestamp)?;

    state
        .store
        .record_snapshot(&metric_uuid, value, timestamp, offset)
        .await?;

    Ok(StatusCode::CREATED)
}

/// Query a metric's snapshots inside an optional time range.
///
/// GET /snapshots?metric_uuid=..&start=..&end=..
pub async fn list_snapshots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SnapshotsQuery>,
) -> ApiResult<Json<Vec<SnapshotSummary>>> {
    let metric_uuid = query
        .metric_uuid
        .ok_or_else(|| ApiError::BadRequest("Metric UUID is required".to_string()))?;

    let start = query.start.as_deref().map(parse_timestamp).transpose()?;
    let end = query.end.as_deref().map(parse_timestamp).transpose()?;

    let snapshots = state
        .store
        .snapshots(&metric_uuid, start, end)
        .await?
        .into_iter()
        .map(SnapshotSummary::from)
        .collect();

    Ok(Json(snapshots))
}

/// Return the newest snapshot of every metric.
///
/// GET /latest_snapshots
pub async fn latest_snapshots(State(state): State<Arc<AppState>>) -> Json<Vec<LatestSnapshot>> {
    let latest = state
        .store
        .latest_snapshots()
        .await
        .into_iter()
        .map(LatestSnapshot::from)
        .collect();

    Json(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use pulse_data::{MemoryStore, MetricsStore};

    async fn state_with_metric() -> (Arc<AppState>, String) {
        let store = Arc::new(MemoryStore::new());
        let aggregator = store.register_aggregator("node-1").await.unwrap();
        let metric = store
            .register_metric(&aggregator.uuid, "cpu", "percent")
            .await
            .unwrap();
        let state = Arc::new(AppState::new(ApiConfig::default(), store));
        (state, metric.uuid)
    }

    #[tokio::test]
    async fn test_submit_snapshot() {
        let (state, metric_uuid) = state_with_metric().await;
        let request = SubmitSnapshotRequest {
            metric_uuid: Some(metric_uuid),
            value: Some(42.5),
            timestamp: Some("2026-08-30T12:00:00Z".to_string()),
            offset: Some(0),
        };

        let status = submit_snapshot(State(state), Json(request)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_submit_snapshot_missing_fields() {
        let (state, metric_uuid) = state_with_metric().await;
        let request = SubmitSnapshotRequest {
            metric_uuid: Some(metric_uuid),
            value: Some(42.5),
            timestamp: None,
            offset: Some(0),
        };

        let err = submit_snapshot(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_snapshot_bad_timestamp() {
        let (state, metric_uuid) = state_with_metric().await;
        let request = SubmitSnapshotRequest {
            metric_uuid: Some(metric_uuid),
            value: Some(42.5),
            timestamp: Some("yesterday".to_string()),
            offset: Some(0),
        };

        let err = submit_snapshot(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_snapshot_unknown_metric() {
        let (state, _) = state_with_metric().await;
        let request = SubmitSnapshotRequest {
            metric_uuid: Some("missing".to_string()),
            value: Some(1.0),
            timestamp: Some("2026-08-30T12:00:00Z".to_string()),
            offset: Some(0),
        };

        let err = submit_snapshot(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_snapshots_requires_metric_uuid() {
        let (state, _) = state_with_metric().await;
        let query = SnapshotsQuery {
            metric_uuid: None,
            start: None,
            end: None,
        };

        let err = list_snapshots(State(state), Query(query)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_snapshots_with_range() {
        let (state, metric_uuid) = state_with_metric().await;
        for ts in ["2026-08-30T12:00:00Z", "2026-08-30T13:00:00Z"] {
            let request = SubmitSnapshotRequest {
                metric_uuid: Some(metric_uuid.clone()),
                value: Some(1.0),
                timestamp: Some(ts.to_string()),
                offset: Some(0),
            };
            submit_snapshot(State(state.clone()), Json(request))
                .await
                .unwrap();
        }

        let query = SnapshotsQuery {
            metric_uuid: Some(metric_uuid),
            start: Some("2026-08-30T12:30:00Z".to_string()),
            end: None,
        };
        let response = list_snapshots(State(state), Query(query)).await.unwrap();
        assert_eq!(response.len(), 1);
    }

    #[tokio::test]
    async fn test_latest_snapshots() {
        let (state, metric_uuid) = state_with_metric().await;
        for (value, ts) in [(1.0, "2026-08-30T12:00:00Z"), (2.0, "2026-08-30T13:00:00Z")] {
            let request = SubmitSnapshotRequest {
                metric_uuid: Some(metric_uuid.clone()),
                value: Some(value),
                timestamp: Some(ts.to_string()),
                offset: Some(0),
            };
            submit_snapshot(State(state.clone()), Json(request))
                .await
                .unwrap();
        }

        let response = latest_snapshots(State(state)).await;
        assert_eq!(response.len(), 1);
        assert_eq!(response[0].value, 2.0);
    }
}
