//! Dedup API: HTTP surface of the exactly-once event aggregator.

use axum::Router;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use crate::state::AppState;

/// Builds the full router with every route mounted.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::publish::router())
        .merge(routes::stats::router())
        .merge(routes::events::router())
        .with_state(state)
}
