//! Aggregator registration and listing handlers.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use pulse_data::Aggregator;

/// Register aggregator request.
#[derive(Debug, Deserialize)]
pub struct RegisterAggregatorRequest {
    /// Aggregator name (required)
    #[serde(default)]
    pub name: Option<String>,
}

/// Response carrying the UUID of a newly registered resource.
#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    /// Assigned UUID
    pub uuid: String,
}

/// Aggregator list item.
#[derive(Debug, Serialize)]
pub struct AggregatorSummary {
    /// Aggregator UUID
    pub uuid: String,
    /// Aggregator name
    pub name: String,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
    /// Last snapshot activity
    pub last_active: DateTime<Utc>,
}

impl From<Aggregator> for AggregatorSummary {
    fn from(a: Aggregator) -> Self {
        Self {
            uuid: a.uuid,
            name: a.name,
            created_at: a.created_at,
            last_active: a.last_active,
        }
    }
}

/// Register a new aggregator.
///
/// POST /register_aggregator
pub async fn register_aggregator(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterAggregatorRequest>,
) -> ApiResult<(StatusCode, Json<RegisteredResponse>)> {
    let name = request
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Name is required".to_string()))?;

    let aggregator = state.store.register_aggregator(&name).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse {
            uuid: aggregator.uuid,
        }),
    ))
}

/// List all aggregators.
///
/// GET /aggregators
pub async fn list_aggregators(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<AggregatorSummary>> {
    let aggregators = state
        .store
        .list_aggregators()
        .await
        .into_iter()
        .map(AggregatorSummary::from)
        .collect();

    Json(aggregators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use pulse_data::MemoryStore;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            ApiConfig::default(),
            Arc::new(MemoryStore::new()),
        ))
    }

    #[tokio::test]
    async fn test_register_aggregator() {
        let state = test_state();
        let request = RegisterAggregatorRequest {
            name: Some("node-1".to_string()),
        };

        let (status, response) = register_aggregator(State(state), Json(request))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(!response.uuid.is_empty());
    }

    #[tokio::test]
    async fn test_register_aggregator_missing_name() {
        let state = test_state();
        let request = RegisterAggregatorRequest { name: None };

        let err = register_aggregator(State(state), Json(request))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_aggregator_duplicate_name() {
        let state = test_state();
        for expected in [Ok(()), Err(StatusCode::CONFLICT)] {
            let request = RegisterAggregatorRequest {
                name: Some("node-1".to_string()),
            };
            let result = register_aggregator(State(state.clone()), Json(request)).await;
            match expected {
                Ok(()) => assert!(result.is_ok()),
                Err(status) => assert_eq!(result.unwrap_err().status_code(), status),
            }
        }
    }

    #[tokio::test]
    async fn test_list_aggregators() {
        let state = test_state();
        let request = RegisterAggregatorRequest {
            name: Some("node-1".to_string()),
        };
        register_aggregator(State(state.clone()), Json(request))
            .await
            .unwrap();

        let response = list_aggregators(State(state)).await;
        assert_eq!(response.len(), 1);
        assert_eq!(response[0].name, "node-1");
    }
}
