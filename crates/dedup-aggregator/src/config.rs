//! Aggregator configuration.

use dedup_core::error::DedupError;

/// Number of workers spawned when none is configured.
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Tunables for an [`EventAggregator`](crate::EventAggregator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    worker_count: usize,
}

impl AggregatorConfig {
    /// Creates a configuration with `worker_count` concurrent workers.
    ///
    /// # Errors
    ///
    /// Returns `DedupError::Validation` if `worker_count` is zero.
    pub fn new(worker_count: usize) -> Result<Self, DedupError> {
        if worker_count == 0 {
            return Err(DedupError::Validation(
                "worker_count must be at least 1".into(),
            ));
        }
        Ok(Self { worker_count })
    }

    /// Number of concurrent workers draining the queue.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }
}
