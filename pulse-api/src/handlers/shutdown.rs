//! Shutdown command dispatch and status handlers.
//!
//! Dispatching is best-effort by design: the operator is told the command
//! was issued, not that any aggregator instance received it. Delivery
//! confirmation would need a request/acknowledgement protocol, which this
//! control signal deliberately avoids.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::events::EventMessage;
use crate::state::AppState;

/// Shutdown command request.
#[derive(Debug, Deserialize)]
pub struct ShutdownRequest {
    /// UUID of the aggregator to shut down (required)
    #[serde(default)]
    pub aggregator_uuid: Option<String>,
}

/// Poll-based shutdown status response.
#[derive(Debug, Serialize)]
pub struct ShutdownStatusResponse {
    /// Whether a shutdown command has been issued for this aggregator
    pub shutdown_requested: bool,
}

/// Issue a shutdown command for an aggregator.
///
/// POST /shutdown_aggregator
///
/// Returns 200 with an empty body once the command is issued, whether
/// zero, one, or many streams received it.
pub async fn shutdown_aggregator(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ShutdownRequest>,
) -> ApiResult<StatusCode> {
    let aggregator_uuid = request
        .aggregator_uuid
        .ok_or_else(|| ApiError::BadRequest("Aggregator UUID is required".to_string()))?;

    if !state.store.aggregator_exists(&aggregator_uuid).await {
        return Err(ApiError::NotFound(format!(
            "Aggregator with UUID \"{aggregator_uuid}\" not found"
        )));
    }

    state.shutdown_flags.mark(&aggregator_uuid);
    let delivered = state.broker.publish(&aggregator_uuid, EventMessage::Shutdown);

    info!(
        aggregator = %aggregator_uuid,
        delivered,
        "shutdown command dispatched"
    );

    Ok(StatusCode::OK)
}

/// Poll whether a shutdown has been requested for an aggregator.
///
/// GET /shutdown_status/{aggregator_uuid}
///
/// The flag is sticky: once set it stays set, so pollers cannot miss it.
pub async fn shutdown_status(
    State(state): State<Arc<AppState>>,
    Path(aggregator_uuid): Path<String>,
) -> ApiResult<Json<ShutdownStatusResponse>> {
    if !state.store.aggregator_exists(&aggregator_uuid).await {
        return Err(ApiError::NotFound(format!(
            "Aggregator with UUID \"{aggregator_uuid}\" not found"
        )));
    }

    Ok(Json(ShutdownStatusResponse {
        shutdown_requested: state.shutdown_flags.is_requested(&aggregator_uuid),
    }))
}
