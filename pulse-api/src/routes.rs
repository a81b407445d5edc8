//! API route definitions.

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;
use crate::events;
use crate::handlers::{aggregators, health, metrics, shutdown, snapshots};
use crate::state::AppState;

/// Creates the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = state
        .config
        .cors
        .enabled
        .then(|| build_cors_layer(&state.config.cors));

    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/register_aggregator", post(aggregators::register_aggregator))
        .route("/aggregators", get(aggregators::list_aggregators))
        .route("/register_metric", post(metrics::register_metric))
        .route("/metrics", get(metrics::list_metrics))
        .route("/snapshot", post(snapshots::submit_snapshot))
        .route("/snapshots", get(snapshots::list_snapshots))
        .route("/latest_snapshots", get(snapshots::latest_snapshots))
        .route("/shutdown_aggregator", post(shutdown::shutdown_aggregator))
        .route(
            "/shutdown_events/{aggregator_uuid}",
            get(events::shutdown_events),
        )
        .route(
            "/shutdown_status/{aggregator_uuid}",
            get(shutdown::shutdown_status),
        )
        .with_state(state);

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Builds the CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
