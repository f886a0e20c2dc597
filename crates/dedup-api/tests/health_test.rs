//! Integration tests for the health endpoint.

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_returns_200_with_status_ok() {
    let app = common::build_test_app().await;

    let (status, json) = common::get_json(app.router.clone(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["running"], true);

    app.shutdown().await;
}

#[tokio::test]
async fn test_health_reports_not_running_after_stop() {
    let app = common::build_test_app().await;
    app.aggregator.stop().await;

    let (status, json) = common::get_json(app.router.clone(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["running"], false);

    app.store.close().await.unwrap();
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = common::build_test_app().await;

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/nonexistent")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    app.shutdown().await;
}
