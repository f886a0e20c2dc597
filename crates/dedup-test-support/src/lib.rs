//! Shared test doubles and fixtures for the exactly-once event aggregator.

mod clock;
mod event;
mod store;

pub use clock::{FixedClock, SteppingClock};
pub use event::{FIXED_TIMESTAMP, event, event_with_source};
pub use store::{FailingDedupStore, InMemoryDedupStore};
