//! Dedup Aggregator: exactly-once processing of at-least-once deliveries.
//!
//! [`EventAggregator`] accepts batches of events, drops known duplicates on a
//! best-effort fast path, and hands the rest to a fixed pool of workers. Each
//! worker asks the `DedupStore` to record the event; the store's atomic
//! insert is the only authority on whether an event is new.

pub mod aggregator;
pub mod config;
pub mod queue;
pub mod stats;
mod worker;

pub use aggregator::EventAggregator;
pub use config::{AggregatorConfig, DEFAULT_WORKER_COUNT};
pub use stats::{EventView, PublishResult, StatsResponse};
