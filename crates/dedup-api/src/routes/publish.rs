//! Event ingestion endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use dedup_aggregator::PublishResult;
use dedup_core::event::Event;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::state::AppState;

/// Request body for POST /publish.
///
/// Accepts a bare event, a bare array, or an `{"events": [...]}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PublishRequest {
    /// A JSON array of events.
    Batch(Vec<Event>),
    /// An object wrapping the events.
    Envelope {
        /// Events to publish, in order.
        events: Vec<Event>,
    },
    /// A single event object.
    Single(Event),
}

impl PublishRequest {
    /// Flattens the request into the events it carries.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        match self {
            Self::Batch(events) | Self::Envelope { events } => events,
            Self::Single(event) => vec![event],
        }
    }
}

/// POST /publish
#[instrument(skip(state, request))]
async fn publish(
    State(state): State<AppState>,
    Json(request): Json<PublishRequest>,
) -> Json<PublishResult> {
    let correlation_id = Uuid::new_v4();
    let events = request.into_events();

    info!(%correlation_id, batch_size = events.len(), "handling publish request");

    let result = state.aggregator.publish(events).await;

    info!(
        %correlation_id,
        accepted = result.accepted,
        duplicates_immediate = result.duplicates_immediate,
        "publish request handled"
    );

    Json(result)
}

/// Returns the ingestion router.
pub fn router() -> Router<AppState> {
    Router::new().route("/publish", post(publish))
}
