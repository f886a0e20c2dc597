//! Deduplication store abstraction.

use async_trait::async_trait;

use crate::error::DedupError;
use crate::record::{ProcessedRecord, StoreStats};

/// Durable ledger of processed `(topic, event_id)` pairs.
///
/// Implementations serialize every call behind one critical section per
/// instance; no call is partially interleaved with another.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Non-authoritative check whether the key has already been processed.
    ///
    /// The answer may be stale by the time the caller acts on it. Only
    /// [`DedupStore::mark_processed`] decides whether an event is new.
    async fn is_duplicate(&self, topic: &str, event_id: &str) -> Result<bool, DedupError>;

    /// Atomically records the key as processed.
    ///
    /// Returns `Ok(true)` if this call performed the first insertion for the
    /// key and `Ok(false)` if a record already existed. A duplicate is never
    /// reported as an error.
    async fn mark_processed(
        &self,
        topic: &str,
        event_id: &str,
        timestamp: &str,
    ) -> Result<bool, DedupError>;

    /// Returns processed records, newest `processed_at` first, optionally
    /// restricted to one topic.
    async fn get_processed_events(
        &self,
        topic: Option<&str>,
    ) -> Result<Vec<ProcessedRecord>, DedupError>;

    /// Returns the total number of unique keys and the per-topic breakdown.
    async fn get_stats(&self) -> Result<StoreStats, DedupError>;

    /// Deletes every record. Reserved for tests and resets.
    async fn clear(&self) -> Result<(), DedupError>;
}
