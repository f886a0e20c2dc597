//! Event fixtures.

use dedup_core::event::Event;

/// Event time used by fixtures that do not care about it.
pub const FIXED_TIMESTAMP: &str = "2025-10-18T10:00:00Z";

/// Builds a valid event with an empty payload.
///
/// # Panics
///
/// Panics if `topic` or `event_id` is empty.
#[must_use]
pub fn event(topic: &str, event_id: &str) -> Event {
    event_with_source(topic, event_id, "test")
}

/// Builds a valid event attributed to `source`.
///
/// # Panics
///
/// Panics if `topic` or `event_id` is empty.
#[must_use]
pub fn event_with_source(topic: &str, event_id: &str, source: &str) -> Event {
    Event::new(
        topic,
        event_id,
        FIXED_TIMESTAMP,
        source,
        serde_json::json!({}),
    )
    .expect("fixture events are valid")
}
