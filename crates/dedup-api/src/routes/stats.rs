//! Aggregate statistics endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use dedup_aggregator::StatsResponse;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /stats
async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    Ok(Json(state.aggregator.get_stats().await?))
}

/// Returns the statistics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}
