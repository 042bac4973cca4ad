//! API Handlers
//!
//! Request handlers for the admin endpoints. Both are read-only; neither
//! takes more than a read lock on the cache.

use axum::{extract::State, Json};

use crate::models::{HealthResponse, StatsResponse};
use crate::state::AppState;

/// Handler for GET /stats
///
/// Returns a snapshot of the cache counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    let stats = cache.stats();

    Json(StatsResponse::new(
        stats.hits,
        stats.misses,
        stats.evictions,
        cache.len(),
        cache.total_bytes(),
    ))
}

/// Handler for GET /health
///
/// Returns health status of the proxy.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
