//! Ledger records and store-level statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::DedupError;

/// Persisted proof that a `(topic, event_id)` pair was processed.
///
/// Exactly one record exists per key. Records are never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedRecord {
    /// Topic of the processed event.
    pub topic: String,
    /// Event identifier within the topic.
    pub event_id: String,
    /// Event time copied from the event.
    pub timestamp: String,
    /// Wall-clock time of the first successful insertion.
    pub processed_at: DateTime<Utc>,
}

/// Aggregate counts read from the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Number of unique keys ever processed.
    pub total_unique: u64,
    /// Unique keys per topic.
    pub topics: BTreeMap<String, u64>,
}

/// Renders `processed_at` in the fixed-width text form stored on disk.
///
/// Microsecond precision with a `Z` suffix keeps lexicographic order equal
/// to chronological order.
#[must_use]
pub fn format_processed_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a stored `processed_at` value.
///
/// # Errors
///
/// Returns `DedupError::Store` if the stored text is not RFC 3339.
pub fn parse_processed_at(text: &str) -> Result<DateTime<Utc>, DedupError> {
    DateTime::parse_from_rfc3339(text)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| DedupError::Store(format!("corrupt processed_at {text:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_processed_at_is_fixed_width_utc() {
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

        assert_eq!(format_processed_at(at), "2026-01-15T10:00:00.000000Z");
    }

    #[test]
    fn test_parse_processed_at_reads_formatted_value() {
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

        assert_eq!(parse_processed_at(&format_processed_at(at)).unwrap(), at);
    }

    #[test]
    fn test_parse_processed_at_reports_corruption_as_store_error() {
        assert!(matches!(
            parse_processed_at("garbage"),
            Err(DedupError::Store(_))
        ));
    }
}
