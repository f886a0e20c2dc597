//! Dedup Core: shared event model and store abstraction.
//!
//! This crate defines the event type, ledger records, error type and the
//! `DedupStore` trait that the store and aggregator crates build on. It
//! contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod event;
pub mod record;
pub mod store;
