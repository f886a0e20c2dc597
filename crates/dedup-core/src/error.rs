//! Error types shared by every crate in the workspace.

use thiserror::Error;

/// Top-level error type for event validation and deduplication storage.
///
/// A duplicate key is never an error: `DedupStore::mark_processed` reports it
/// as `Ok(false)`.
#[derive(Debug, Error)]
pub enum DedupError {
    /// An event failed validation before reaching the queue.
    #[error("validation error: {0}")]
    Validation(String),

    /// A persistence failure other than a uniqueness violation.
    #[error("store error: {0}")]
    Store(String),

    /// The store was closed and can no longer serve requests.
    #[error("store is closed")]
    StoreClosed,
}
