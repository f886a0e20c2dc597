//! Shared application state.

use std::sync::Arc;

use dedup_aggregator::EventAggregator;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The running aggregator behind every route.
    pub aggregator: Arc<EventAggregator>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(aggregator: Arc<EventAggregator>) -> Self {
        Self { aggregator }
    }
}
