//! Dedup API server entry point.

use std::sync::Arc;

use dedup_aggregator::EventAggregator;
use dedup_api::config::ServerConfig;
use dedup_api::error::AppError;
use dedup_api::state::AppState;
use dedup_store::SqliteDedupStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting dedup aggregator API server");

    let config = ServerConfig::from_env()?;
    let addr = config.socket_addr()?;

    let store = Arc::new(SqliteDedupStore::open(&config.database_path).await?);
    tracing::info!(path = %config.database_path.display(), "opened dedup store");

    let aggregator = Arc::new(EventAggregator::with_config(
        store.clone(),
        config.aggregator,
    ));
    aggregator.start().await;

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = dedup_api::app(AppState::new(Arc::clone(&aggregator)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(queue_depth = aggregator.queue_depth(), "shutting down");
    aggregator.stop().await;
    store.close().await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
