//! Integration tests for publishing and querying over a real `SQLite` store.

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_publish_then_query_round_trip() {
    // Arrange
    let app = common::build_test_app().await;
    let body = json!([
        common::wire_event("orders", "evt_1"),
        common::wire_event("orders", "evt_2"),
        common::wire_event("payments", "evt_1"),
    ]);

    // Act
    let (status, json) = common::post_json(app.router.clone(), "/publish", &body).await;
    app.drained().await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["accepted"], 3);

    let (status, stats) = common::get_json(app.router.clone(), "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["received"], 3);
    assert_eq!(stats["unique_processed"], 3);
    assert_eq!(stats["duplicate_dropped"], 0);
    assert_eq!(stats["topics"]["orders"], 2);
    assert_eq!(stats["topics"]["payments"], 1);

    let (status, events) = common::get_json(app.router.clone(), "/events?topic=orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 2);

    app.shutdown().await;
}

#[tokio::test]
async fn test_republishing_is_reported_as_immediate_duplicate() {
    // Arrange
    let app = common::build_test_app().await;
    let evt = common::wire_event("orders", "evt_1");
    common::post_json(app.router.clone(), "/publish", &evt).await;
    app.drained().await;

    // Act
    let (status, json) =
        common::post_json(app.router.clone(), "/publish", &json!({"events": [evt]})).await;
    app.drained().await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["accepted"], 0);
    assert_eq!(json["duplicates_immediate"], 1);

    let (_, stats) = common::get_json(app.router.clone(), "/stats").await;
    assert_eq!(stats["received"], 2);
    assert_eq!(stats["unique_processed"], 1);
    assert_eq!(stats["duplicate_dropped"], 1);

    app.shutdown().await;
}

#[tokio::test]
async fn test_malformed_event_returns_422_and_is_not_counted() {
    // Arrange
    let app = common::build_test_app().await;
    let mut evt = common::wire_event("orders", "evt_1");
    evt["event_id"] = json!("");

    // Act
    let (status, _) = common::post_json(app.router.clone(), "/publish", &evt).await;

    // Assert
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (_, stats) = common::get_json(app.router.clone(), "/stats").await;
    assert_eq!(stats["received"], 0);

    app.shutdown().await;
}

#[tokio::test]
async fn test_queries_after_store_close_return_503() {
    let app = common::build_test_app().await;
    app.aggregator.stop().await;
    app.store.close().await.unwrap();

    let (status, json) = common::get_json(app.router.clone(), "/stats").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "store_closed");
}
