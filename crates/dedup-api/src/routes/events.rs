//! Processed-event listing endpoint.

use axum::extract::{Query, State};
use axum::{Json, Router, routing::get};
use dedup_aggregator::EventView;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for GET /events.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Only return events recorded under this topic. Empty means all topics.
    pub topic: Option<String>,
}

/// GET /events
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<EventView>>, ApiError> {
    let events = state.aggregator.get_events(query.topic.as_deref()).await?;
    Ok(Json(events))
}

/// Returns the event listing router.
pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(list_events))
}
