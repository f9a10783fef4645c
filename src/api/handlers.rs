//! Admin API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use axum::{extract::State, Json};

use crate::models::{HealthResponse, StatsResponse};
use crate::state::AppState;

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    // Read guard only; the snapshot is taken inside
    let (stats, max_cache_size) = {
        let cache = state.cache.read().await;
        (cache.stats(), cache.max_cache_size())
    };

    Json(StatsResponse::new(
        &stats,
        max_cache_size,
        state.settings.max_object_size,
    ))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
