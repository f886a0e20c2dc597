//! Dedup Store: durable ledger of processed events.
//!
//! The [`SqliteDedupStore`] is the authoritative answer to "has this event
//! already been processed". It owns a single SQLite connection guarded by
//! one async mutex, so every call is fully serialized.

pub mod schema;
pub mod sqlite_dedup_store;

pub use sqlite_dedup_store::SqliteDedupStore;
