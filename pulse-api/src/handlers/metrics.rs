//! Metric registration and listing handlers.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::handlers::aggregators::RegisteredResponse;
use crate::state::AppState;

/// Register metric request.
#[derive(Debug, Deserialize)]
pub struct RegisterMetricRequest {
    /// Owning aggregator UUID (required)
    #[serde(default)]
    pub aggregator_uuid: Option<String>,
    /// Metric name (required)
    #[serde(default)]
    pub name: Option<String>,
    /// Unit of measurement (required)
    #[serde(default)]
    pub unit: Option<String>,
}

/// Metric list item.
#[derive(Debug, Serialize)]
pub struct MetricSummary {
    /// Metric UUID
    pub uuid: String,
    /// Metric name
    pub name: String,
    /// Unit of measurement
    pub unit: String,
    /// Owning aggregator's name
    pub aggregator_name: String,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

/// Register a new metric under an aggregator.
///
/// POST /register_metric
pub async fn register_metric(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterMetricRequest>,
) -> ApiResult<(StatusCode, Json<RegisteredResponse>)> {
    let (Some(aggregator_uuid), Some(name), Some(unit)) =
        (request.aggregator_uuid, request.name, request.unit)
    else {
        return Err(ApiError::BadRequest(
            "Aggregator UUID, metric name, and unit are required".to_string(),
        ));
    };

    let metric = state
        .store
        .register_metric(&aggregator_uuid, &name, &unit)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse { uuid: metric.uuid }),
    ))
}

/// List all metrics with their owning aggregator's name.
///
/// GET /metrics
pub async fn list_metrics(State(state): State<Arc<AppState>>) -> Json<Vec<MetricSummary>> {
    let mut summaries = Vec::new();

    for metric in state.store.list_metrics().await {
        let aggregator_name = state
            .store
            .aggregator(&metric.aggregator_uuid)
            .await
            .map(|a| a.name)
            .unwrap_or_default();

        summaries.push(MetricSummary {
            uuid: metric.uuid,
            name: metric.name,
            unit: metric.unit,
            aggregator_name,
            created_at: metric.created_at,
        });
    }

    Json(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use pulse_data::{MemoryStore, MetricsStore};

    async fn state_with_aggregator() -> (Arc<AppState>, String) {
        let store = Arc::new(MemoryStore::new());
        let aggregator = store.register_aggregator("node-1").await.unwrap();
        let state = Arc::new(AppState::new(ApiConfig::default(), store));
        (state, aggregator.uuid)
    }

    #[tokio::test]
    async fn test_register_metric() {
        let (state, aggregator_uuid) = state_with_aggregator().await;
        let request = RegisterMetricRequest {
            aggregator_uuid: Some(aggregator_uuid),
            name: Some("cpu_load".to_string()),
            unit: Some("percent".to_string()),
        };

        let (status, response) = register_metric(State(state), Json(request)).await.unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(!response.uuid.is_empty());
    }

    #[tokio::test]
    async fn test_register_metric_missing_fields() {
        let (state, aggregator_uuid) = state_with_aggregator().await;
        let request = RegisterMetricRequest {
            aggregator_uuid: Some(aggregator_uuid),
            name: None,
            unit: Some("percent".to_string()),
        };

        let err = register_metric(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_metric_unknown_aggregator() {
        let (state, _) = state_with_aggregator().await;
        let request = RegisterMetricRequest {
            aggregator_uuid: Some("missing".to_string()),
            name: Some("cpu_load".to_string()),
            unit: Some("percent".to_string()),
        };

        let err = register_metric(State(state), Json(request)).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_metrics_includes_aggregator_name() {
        let (state, aggregator_uuid) = state_with_aggregator().await;
        let request = RegisterMetricRequest {
            aggregator_uuid: Some(aggregator_uuid),
            name: Some("cpu_load".to_string()),
            unit: Some("percent".to_string()),
        };
        register_metric(State(state.clone()), Json(request))
            .await
            .unwrap();

        let response = list_metrics(State(state)).await;
        assert_eq!(response.len(), 1);
        assert_eq!(response[0].aggregator_name, "node-1");
    }
}
