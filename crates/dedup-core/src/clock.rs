//! Clock abstraction for `processed_at` stamping.

use chrono::{DateTime, Utc};

use crate::record::format_processed_at;

/// Source of wall-clock time for the deduplication ledger.
///
/// Tests inject fixed or stepping clocks so that `processed_at` ordering is
/// deterministic.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current time in the ledger's on-disk text format.
    fn now_text(&self) -> String {
        format_processed_at(self.now())
    }
}

/// Production clock backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
