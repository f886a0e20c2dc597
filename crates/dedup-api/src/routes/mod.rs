//! Route modules, one per endpoint group.

pub mod events;
pub mod health;
pub mod publish;
pub mod stats;
