//! Test stores: `DedupStore` implementations for tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dedup_core::error::DedupError;
use dedup_core::record::{ProcessedRecord, StoreStats};
use dedup_core::store::DedupStore;

/// An in-memory ledger with the same first-writer-wins semantics as the
/// `SQLite` store.
///
/// The builder methods make otherwise timing-dependent paths reachable on
/// demand.
#[derive(Debug, Default)]
pub struct InMemoryDedupStore {
    records: Mutex<Vec<ProcessedRecord>>,
    keys: Mutex<HashSet<(String, String)>>,
    stale_reads: bool,
    failing_topic: Option<String>,
    panicking_topic: Option<String>,
    latency: Option<Duration>,
    mark_attempts: AtomicUsize,
}

impl InMemoryDedupStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `is_duplicate` call reports `false`, as if the read were always
    /// stale. Duplicates are then only caught by `mark_processed`.
    #[must_use]
    pub fn with_stale_reads(mut self) -> Self {
        self.stale_reads = true;
        self
    }

    /// `mark_processed` fails with `DedupError::Store` for `topic`.
    #[must_use]
    pub fn failing_topic(mut self, topic: &str) -> Self {
        self.failing_topic = Some(topic.to_owned());
        self
    }

    /// `mark_processed` panics for `topic`.
    #[must_use]
    pub fn panicking_topic(mut self, topic: &str) -> Self {
        self.panicking_topic = Some(topic.to_owned());
        self
    }

    /// `is_duplicate` and `mark_processed` sleep for `latency` before
    /// answering.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Number of `mark_processed` calls received, successful or not.
    pub fn mark_attempts(&self) -> usize {
        self.mark_attempts.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored records in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn records(&self) -> Vec<ProcessedRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn is_duplicate(&self, topic: &str, event_id: &str) -> Result<bool, DedupError> {
        self.delay().await;
        if self.stale_reads {
            return Ok(false);
        }
        Ok(self
            .keys
            .lock()
            .unwrap()
            .contains(&(topic.to_owned(), event_id.to_owned())))
    }

    async fn mark_processed(
        &self,
        topic: &str,
        event_id: &str,
        timestamp: &str,
    ) -> Result<bool, DedupError> {
        self.mark_attempts.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        assert!(
            self.panicking_topic.as_deref() != Some(topic),
            "simulated store panic for topic {topic}"
        );
        if self.failing_topic.as_deref() == Some(topic) {
            return Err(DedupError::Store("disk I/O error".into()));
        }

        let mut keys = self.keys.lock().unwrap();
        if !keys.insert((topic.to_owned(), event_id.to_owned())) {
            return Ok(false);
        }
        self.records.lock().unwrap().push(ProcessedRecord {
            topic: topic.to_owned(),
            event_id: event_id.to_owned(),
            timestamp: timestamp.to_owned(),
            processed_at: Utc::now(),
        });
        Ok(true)
    }

    async fn get_processed_events(
        &self,
        topic: Option<&str>,
    ) -> Result<Vec<ProcessedRecord>, DedupError> {
        let mut records: Vec<ProcessedRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| topic.is_none_or(|t| r.topic == t))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.processed_at.cmp(&a.processed_at));
        Ok(records)
    }

    async fn get_stats(&self) -> Result<StoreStats, DedupError> {
        let records = self.records.lock().unwrap();
        let mut topics = BTreeMap::new();
        for record in records.iter() {
            *topics.entry(record.topic.clone()).or_insert(0) += 1;
        }
        Ok(StoreStats {
            total_unique: records.len() as u64,
            topics,
        })
    }

    async fn clear(&self) -> Result<(), DedupError> {
        let mut keys = self.keys.lock().unwrap();
        self.records.lock().unwrap().clear();
        keys.clear();
        Ok(())
    }
}

/// A store whose every call fails with an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingDedupStore;

#[async_trait]
impl DedupStore for FailingDedupStore {
    async fn is_duplicate(&self, _topic: &str, _event_id: &str) -> Result<bool, DedupError> {
        Err(DedupError::Store("connection refused".into()))
    }

    async fn mark_processed(
        &self,
        _topic: &str,
        _event_id: &str,
        _timestamp: &str,
    ) -> Result<bool, DedupError> {
        Err(DedupError::Store("connection refused".into()))
    }

    async fn get_processed_events(
        &self,
        _topic: Option<&str>,
    ) -> Result<Vec<ProcessedRecord>, DedupError> {
        Err(DedupError::Store("connection refused".into()))
    }

    async fn get_stats(&self) -> Result<StoreStats, DedupError> {
        Err(DedupError::Store("connection refused".into()))
    }

    async fn clear(&self) -> Result<(), DedupError> {
        Err(DedupError::Store("connection refused".into()))
    }
}
