//! The event aggregator: publish, lifecycle and statistics.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use dedup_core::error::DedupError;
use dedup_core::event::Event;
use dedup_core::store::DedupStore;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::AggregatorConfig;
use crate::stats::{EventView, PublishResult, StatsResponse};
use crate::worker::{Pipeline, WorkerPool};

/// Accepts events, queues the ones not known to be duplicates, and runs a
/// worker pool that records each queued event in the [`DedupStore`].
///
/// The store is shared: it may outlive the aggregator, and a new aggregator
/// over a store reopened on the same file resumes with every earlier record.
pub struct EventAggregator {
    pipeline: Arc<Pipeline>,
    config: AggregatorConfig,
    workers: Mutex<Option<WorkerPool>>,
    started_at: OnceLock<Instant>,
}

impl std::fmt::Debug for EventAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventAggregator")
            .field("config", &self.config)
            .field("queue_depth", &self.queue_depth())
            .finish_non_exhaustive()
    }
}

impl EventAggregator {
    /// Creates a stopped aggregator with the default configuration.
    #[must_use]
    pub fn new(store: Arc<dyn DedupStore>) -> Self {
        Self::with_config(store, AggregatorConfig::default())
    }

    /// Creates a stopped aggregator.
    #[must_use]
    pub fn with_config(store: Arc<dyn DedupStore>, config: AggregatorConfig) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::new(store)),
            config,
            workers: Mutex::new(None),
            started_at: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> AggregatorConfig {
        self.config
    }

    /// Spawns the worker pool. Does nothing if it is already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn start(&self) {
        let mut workers = self.workers.lock().await;
        if workers.is_some() {
            return;
        }
        self.started_at.get_or_init(Instant::now);

        let pool = WorkerPool::spawn(self.config.worker_count(), &self.pipeline);
        info!(workers = pool.len(), "event aggregator started");
        *workers = Some(pool);
    }

    /// Stops the worker pool after it has drained the queue.
    ///
    /// Worker failures are logged, never returned; a never-started
    /// aggregator stops immediately. The aggregator can be started again.
    pub async fn stop(&self) {
        // Release the lock before draining so `is_running` stays responsive.
        let Some(pool) = self.workers.lock().await.take() else {
            return;
        };

        let failures = pool.shutdown().await;
        for failure in &failures {
            error!(error = %failure, "worker exited abnormally");
        }
        info!(failed_workers = failures.len(), "event aggregator stopped");
    }

    /// Whether the worker pool is running.
    pub async fn is_running(&self) -> bool {
        self.workers.lock().await.is_some()
    }

    /// Accepts events for processing, in iteration order.
    ///
    /// Known duplicates are dropped immediately; everything else is queued and
    /// this returns without waiting for processing. The fast-path check can
    /// be stale, so a queued event may still turn out to be a duplicate when
    /// a worker records it.
    pub async fn publish<I>(&self, events: I) -> PublishResult
    where
        I: IntoIterator<Item = Event>,
    {
        let mut result = PublishResult::default();
        let pipeline = &self.pipeline;

        for event in events {
            let (topic, event_id) = event.key();

            let known = match pipeline.store.is_duplicate(topic, event_id).await {
                Ok(known) => known,
                Err(err) => {
                    // The worker still runs the authoritative check.
                    warn!(topic, event_id, error = %err, "fast-path duplicate check failed");
                    false
                }
            };

            // No await from here until the event is dropped or queued.
            pipeline.counters.record_received();
            if known {
                debug!(topic, event_id, "duplicate rejected at publish");
                pipeline.counters.record_duplicate();
                result.duplicates_immediate += 1;
                result.rejected += 1;
                continue;
            }

            pipeline.queue.push(event);
            result.accepted += 1;
        }

        result
    }

    /// Counters, per-topic store counts and uptime, read at call time.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the topic counts cannot be read.
    pub async fn get_stats(&self) -> Result<StatsResponse, DedupError> {
        let store_stats = self.pipeline.store.get_stats().await?;
        let counts = self.pipeline.counters.snapshot();

        Ok(StatsResponse {
            received: counts.received,
            unique_processed: counts.unique_processed,
            duplicate_dropped: counts.duplicate_dropped,
            topics: store_stats.topics,
            uptime: self.uptime().as_secs_f64(),
        })
    }

    /// Processed events, newest first, optionally for one topic. An empty
    /// topic means no filter.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the records cannot be read.
    pub async fn get_events(&self, topic: Option<&str>) -> Result<Vec<EventView>, DedupError> {
        let topic = topic.filter(|t| !t.is_empty());
        let records = self.pipeline.store.get_processed_events(topic).await?;
        Ok(records.into_iter().map(EventView::from).collect())
    }

    /// Time since the first `start`; zero before it.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.started_at
            .get()
            .map_or(Duration::ZERO, Instant::elapsed)
    }

    /// Accepted events that are queued or still being processed.
    #[must_use]
    pub fn queue_depth(&self) -> usize {
        self.pipeline.queue.pending()
    }

    /// Resolves once every accepted event has been processed.
    ///
    /// Never resolves if events are queued while the aggregator is stopped.
    pub async fn wait_until_drained(&self) {
        self.pipeline.queue.wait_until_drained().await;
    }
}
