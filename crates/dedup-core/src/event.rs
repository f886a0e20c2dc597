//! Inbound event model.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::DedupError;

/// Naive ISO-8601 layout accepted when the timestamp carries no offset.
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// An externally produced event.
///
/// Fields are private so that every instance has passed validation. JSON
/// deserialization runs the same checks as [`Event::new`], so a malformed
/// event is rejected before it can reach the ingestion queue.
///
/// Equality and hashing use only the deduplication key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawEvent")]
pub struct Event {
    topic: String,
    event_id: String,
    timestamp: String,
    source: String,
    payload: serde_json::Value,
}

/// Unvalidated wire shape of an [`Event`].
#[derive(Deserialize)]
struct RawEvent {
    topic: String,
    event_id: String,
    timestamp: String,
    source: String,
    #[serde(default = "empty_payload")]
    payload: serde_json::Value,
}

fn empty_payload() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl TryFrom<RawEvent> for Event {
    type Error = DedupError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        Self::new(raw.topic, raw.event_id, raw.timestamp, raw.source, raw.payload)
    }
}

impl Event {
    /// Builds a validated event.
    ///
    /// # Errors
    ///
    /// Returns `DedupError::Validation` if `topic` or `event_id` is empty or
    /// `timestamp` is not an ISO-8601 date-time.
    pub fn new(
        topic: impl Into<String>,
        event_id: impl Into<String>,
        timestamp: impl Into<String>,
        source: impl Into<String>,
        payload: serde_json::Value,
    ) -> Result<Self, DedupError> {
        let topic = topic.into();
        let event_id = event_id.into();
        let timestamp = timestamp.into();

        if topic.trim().is_empty() {
            return Err(DedupError::Validation("topic must not be empty".into()));
        }
        if event_id.trim().is_empty() {
            return Err(DedupError::Validation("event_id must not be empty".into()));
        }
        validate_timestamp(&timestamp)?;

        Ok(Self {
            topic,
            event_id,
            timestamp,
            source: source.into(),
            payload,
        })
    }

    /// The topic this event belongs to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Identifier of the event, unique within its topic.
    #[must_use]
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    /// Event time exactly as supplied by the producer.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// The deduplication key `(topic, event_id)`.
    #[must_use]
    pub fn key(&self) -> (&str, &str) {
        (&self.topic, &self.event_id)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

fn validate_timestamp(value: &str) -> Result<(), DedupError> {
    if DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, NAIVE_TIMESTAMP_FORMAT).is_ok()
    {
        return Ok(());
    }
    Err(DedupError::Validation(format!(
        "timestamp is not a valid ISO-8601 date-time: {value:?}"
    )))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_accepts_rfc3339_timestamp() {
        let event = Event::new(
            "test.topic",
            "evt_001",
            "2025-10-18T10:00:00Z",
            "test",
            json!({"data": "first"}),
        )
        .unwrap();

        assert_eq!(event.topic(), "test.topic");
        assert_eq!(event.event_id(), "evt_001");
        assert_eq!(event.timestamp(), "2025-10-18T10:00:00Z");
        assert_eq!(event.source(), "test");
        assert_eq!(event.payload()["data"], "first");
    }

    #[test]
    fn test_new_accepts_naive_and_fractional_timestamps() {
        assert!(Event::new("t", "e1", "2025-10-18T10:00:00", "s", json!({})).is_ok());
        assert!(Event::new("t", "e2", "2025-10-18T10:00:00.123456", "s", json!({})).is_ok());
        assert!(Event::new("t", "e3", "2025-10-18T10:00:00.5+07:00", "s", json!({})).is_ok());
    }

    #[test]
    fn test_new_rejects_malformed_timestamp() {
        let result = Event::new("invalid", "evt_invalid", "not-a-timestamp", "test", json!({}));

        match result {
            Err(DedupError::Validation(message)) => assert!(message.contains("timestamp")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_new_rejects_empty_topic_and_event_id() {
        assert!(matches!(
            Event::new("", "e1", "2025-10-18T10:00:00Z", "s", json!({})),
            Err(DedupError::Validation(_))
        ));
        assert!(matches!(
            Event::new("t", "  ", "2025-10-18T10:00:00Z", "s", json!({})),
            Err(DedupError::Validation(_))
        ));
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let bad = json!({
            "topic": "t",
            "event_id": "e1",
            "timestamp": "yesterday",
            "source": "s",
        });

        assert!(serde_json::from_value::<Event>(bad).is_err());
    }

    #[test]
    fn test_deserialize_defaults_missing_payload_to_empty_object() {
        let raw = json!({
            "topic": "t",
            "event_id": "e1",
            "timestamp": "2025-10-18T10:00:00Z",
            "source": "s",
        });

        let event: Event = serde_json::from_value(raw).unwrap();

        assert_eq!(event.payload(), &json!({}));
        assert_eq!(event.key(), ("t", "e1"));
    }

    #[test]
    fn test_equality_and_hash_use_only_the_key() {
        // Arrange
        let first = Event::new("t", "e1", "2025-10-18T10:00:00Z", "a", json!({"n": 1})).unwrap();
        let redelivered =
            Event::new("t", "e1", "2025-10-18T11:00:00Z", "b", json!({"n": 2})).unwrap();
        let other_topic =
            Event::new("u", "e1", "2025-10-18T10:00:00Z", "a", json!({"n": 1})).unwrap();

        // Act
        let unique: HashSet<Event> = [first.clone(), redelivered.clone(), other_topic.clone()]
            .into_iter()
            .collect();

        // Assert
        assert_eq!(first, redelivered);
        assert_ne!(first, other_topic);
        assert_eq!(unique.len(), 2);
    }
}
