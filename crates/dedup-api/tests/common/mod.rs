//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use dedup_aggregator::EventAggregator;
use dedup_api::state::AppState;
use dedup_store::SqliteDedupStore;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

/// A running aggregator over a throwaway `SQLite` file, plus its router.
pub struct TestApp {
    pub dir: TempDir,
    pub store: Arc<SqliteDedupStore>,
    pub aggregator: Arc<EventAggregator>,
    pub router: Router,
}

impl TestApp {
    /// Waits until every accepted event has been processed.
    pub async fn drained(&self) {
        tokio::time::timeout(Duration::from_secs(30), self.aggregator.wait_until_drained())
            .await
            .expect("queue did not drain");
    }

    /// Stops the workers and closes the store.
    pub async fn shutdown(self) {
        self.aggregator.stop().await;
        self.store.close().await.unwrap();
    }
}

/// Build the full app router the same way `main.rs` does, over a fresh
/// store in a temporary directory, with the workers started.
pub async fn build_test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        SqliteDedupStore::open(dir.path().join("dedup_store.db"))
            .await
            .unwrap(),
    );
    let aggregator = Arc::new(EventAggregator::new(store.clone()));
    aggregator.start().await;
    let router = dedup_api::app(AppState::new(Arc::clone(&aggregator)));

    TestApp {
        dir,
        store,
        aggregator,
        router,
    }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// A well-formed wire event.
pub fn wire_event(topic: &str, event_id: &str) -> serde_json::Value {
    serde_json::json!({
        "topic": topic,
        "event_id": event_id,
        "timestamp": "2025-10-18T10:00:00Z",
        "source": "integration",
        "payload": {"event_id": event_id}
    })
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}
