//! Worker pool draining the ingestion queue into the dedup store.

use std::sync::Arc;

use dedup_core::event::Event;
use dedup_core::store::DedupStore;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::queue::IngestQueue;
use crate::stats::AggregatorCounters;

/// State shared by the aggregator and every worker.
pub(crate) struct Pipeline {
    pub(crate) store: Arc<dyn DedupStore>,
    pub(crate) queue: IngestQueue,
    pub(crate) counters: AggregatorCounters,
}

/// Completes one queue entry when dropped, including during a panic unwind.
struct Completion<'a>(&'a IngestQueue);

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        self.0.complete();
    }
}

impl Pipeline {
    pub(crate) fn new(store: Arc<dyn DedupStore>) -> Self {
        Self {
            store,
            queue: IngestQueue::new(),
            counters: AggregatorCounters::default(),
        }
    }

    /// Runs the authoritative check for one event and updates the counters.
    async fn process(&self, worker_id: usize, event: Event) {
        let _completion = Completion(&self.queue);
        let (topic, event_id) = event.key();

        match self
            .store
            .mark_processed(topic, event_id, event.timestamp())
            .await
        {
            Ok(true) => {
                self.counters.record_unique();
                debug!(worker_id, topic, event_id, "processed new event");
            }
            Ok(false) => {
                self.counters.record_duplicate();
                debug!(worker_id, topic, event_id, "dropped duplicate event");
            }
            Err(err) => {
                error!(worker_id, topic, event_id, error = %err, "failed to process event");
            }
        }
    }

    /// Processes one event on its own task so that a panic is contained to
    /// that event.
    async fn dispatch(self: &Arc<Self>, worker_id: usize, event: Event) {
        let pipeline = Arc::clone(self);
        let task = tokio::spawn(async move { pipeline.process(worker_id, event).await });
        if let Err(err) = task.await {
            error!(worker_id, error = %err, "event processing panicked");
        }
    }
}

async fn run_worker(worker_id: usize, pipeline: Arc<Pipeline>, shutdown: CancellationToken) {
    info!(worker_id, "worker started");

    while let Some(event) = pipeline.queue.recv(&shutdown).await {
        pipeline.dispatch(worker_id, event).await;
    }

    // Shutdown requested: finish whatever is still queued, then exit.
    while let Some(event) = pipeline.queue.try_recv().await {
        pipeline.dispatch(worker_id, event).await;
    }

    info!(worker_id, "worker stopped");
}

/// A running set of workers sharing one shutdown signal.
pub(crate) struct WorkerPool {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `worker_count` workers on the current Tokio runtime.
    pub(crate) fn spawn(worker_count: usize, pipeline: &Arc<Pipeline>) -> Self {
        let shutdown = CancellationToken::new();
        let handles = (0..worker_count)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(pipeline),
                    shutdown.clone(),
                ))
            })
            .collect();
        Self { shutdown, handles }
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Signals shutdown and waits for every worker to drain and exit.
    ///
    /// Returns the join failures of workers that did not exit cleanly.
    pub(crate) async fn shutdown(mut self) -> Vec<JoinError> {
        self.shutdown.cancel();
        let mut failures = Vec::new();
        for handle in std::mem::take(&mut self.handles) {
            if let Err(err) = handle.await {
                failures.push(err);
            }
        }
        failures
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Workers of a dropped pool drain the queue and exit on their own.
        self.shutdown.cancel();
    }
}
