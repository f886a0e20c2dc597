//! Running counters and the response shapes built from them.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dedup_core::record::{ProcessedRecord, format_processed_at};
use serde::Serialize;

/// Counters shared between publishers and workers.
///
/// Each counter is updated independently, so a snapshot taken while events
/// are in flight may not satisfy
/// `received == unique_processed + duplicate_dropped`; the equation holds
/// once the queue has drained.
#[derive(Debug, Default)]
pub struct AggregatorCounters {
    received: AtomicU64,
    unique_processed: AtomicU64,
    duplicate_dropped: AtomicU64,
}

/// Point-in-time copy of [`AggregatorCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub received: u64,
    pub unique_processed: u64,
    pub duplicate_dropped: u64,
}

impl AggregatorCounters {
    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unique(&self) {
        self.unique_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.duplicate_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Reads all three counters.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            received: self.received.load(Ordering::Relaxed),
            unique_processed: self.unique_processed.load(Ordering::Relaxed),
            duplicate_dropped: self.duplicate_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Outcome of one `publish` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishResult {
    /// Events pushed to the ingestion queue.
    pub accepted: u64,
    /// Events dropped without queueing.
    pub rejected: u64,
    /// Events dropped because the fast-path check already knew the key.
    pub duplicates_immediate: u64,
}

/// Aggregator statistics as exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsResponse {
    /// Every event handed to `publish`.
    pub received: u64,
    /// Events whose first `mark_processed` succeeded.
    pub unique_processed: u64,
    /// Events dropped at the fast path or at `mark_processed`.
    pub duplicate_dropped: u64,
    /// Unique processed records per topic, read from the store.
    pub topics: BTreeMap<String, u64>,
    /// Seconds since the aggregator was first started.
    pub uptime: f64,
}

/// A processed record reshaped for callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    pub topic: String,
    pub event_id: String,
    pub timestamp: String,
    pub processed_at: String,
}

impl From<ProcessedRecord> for EventView {
    fn from(record: ProcessedRecord) -> Self {
        Self {
            processed_at: format_processed_at(record.processed_at),
            topic: record.topic,
            event_id: record.event_id,
            timestamp: record.timestamp,
        }
    }
}
