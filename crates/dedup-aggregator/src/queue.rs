//! Unbounded ingestion queue shared by publishers and workers.

use std::sync::atomic::{AtomicUsize, Ordering};

use dedup_core::event::Event;
use tokio::sync::{Mutex, Notify, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::error;

/// FIFO buffer of accepted events awaiting the authoritative check.
///
/// Enqueueing never blocks. The receiving half sits behind an async mutex so
/// any number of workers can share it; the worker that holds the lock is the
/// one waiting for the next event.
///
/// The queue also tracks how many accepted events have not finished
/// processing, which is what [`IngestQueue::wait_until_drained`] waits on.
#[derive(Debug)]
pub struct IngestQueue {
    sender: mpsc::UnboundedSender<Event>,
    receiver: Mutex<mpsc::UnboundedReceiver<Event>>,
    pending: AtomicUsize,
    drained: Notify,
}

impl Default for IngestQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
            pending: AtomicUsize::new(0),
            drained: Notify::new(),
        }
    }

    /// Appends an event to the back of the queue.
    pub fn push(&self, event: Event) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        if let Err(mpsc::error::SendError(event)) = self.sender.send(event) {
            // Unreachable while `self` owns the receiver.
            error!(
                topic = event.topic(),
                event_id = event.event_id(),
                "ingest queue receiver is gone; event discarded"
            );
            self.complete();
        }
    }

    /// Events accepted but not yet fully processed (queued or in flight).
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Waits for the next event, or returns `None` as soon as `shutdown` is
    /// cancelled.
    pub(crate) async fn recv(&self, shutdown: &CancellationToken) -> Option<Event> {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => None,
            event = async { self.receiver.lock().await.recv().await } => event,
        }
    }

    /// Takes the next event without waiting for one to arrive.
    pub(crate) async fn try_recv(&self) -> Option<Event> {
        self.receiver.lock().await.try_recv().ok()
    }

    /// Marks one previously pushed event as fully processed.
    pub(crate) fn complete(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }

    /// Resolves once every pushed event has been completed.
    ///
    /// Never resolves while events are queued and no worker is running.
    pub async fn wait_until_drained(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            // Register before checking so a completion in between is not lost.
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}
