//! Health probe routing tests

mod common;

use axum::http::StatusCode;
use common::*;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_and_ready_are_public() {
    let pool = setup_test_db().await;
    let app = test_app(pool);

    let response = app
        .clone()
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");

    let response = app
        .oneshot(request("GET", "/ready", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ready");
}
