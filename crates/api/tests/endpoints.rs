//! Router-level tests against the production middleware stack.
//!
//! No engine is running here, so these cover the paths that terminate
//! before any engine call: input validation, routing, and the degraded
//! health report.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use kora_api::config::ServerConfig;
use kora_api::router::build_app_router;
use kora_api::state::AppState;

/// State wired to a port nothing listens on, so any engine call fails
/// immediately instead of hanging.
fn test_state() -> AppState {
    let mut config = ServerConfig::from_env();
    config.engine_host = "127.0.0.1:1".to_string();
    config.manage_engine = false;
    AppState::new(config)
}

async fn post_json(path: &str, body: Value) -> (StatusCode, Value) {
    let app = build_app_router(test_state());
    let response = app
        .oneshot(
            Request::post(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_reports_degraded_without_engine() {
    let app = build_app_router(test_state());
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["engine"], "down");
}

#[tokio::test]
async fn blank_prompt_is_a_validation_error() {
    let (status, body) = post_json(
        "/character-edit",
        json!({ "image_url": "https://example.com/a.png", "prompt": "   " }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn non_http_image_url_is_a_validation_error() {
    let (status, body) = post_json(
        "/light-pattern",
        json!({ "image_url": "ftp://example.com/a.png", "prompt": "relight" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_resolution_preset_rejected() {
    let (status, _) = post_json(
        "/consistent-character",
        json!({
            "image_url": "https://example.com/a.png",
            "prompt": "hi",
            "resolution": "8k"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn missing_required_field_rejected_by_extractor() {
    let (status, _) = post_json("/character-edit", json!({ "prompt": "no image" })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = build_app_router(test_state());
    let response = app
        .oneshot(
            Request::post("/character-edit/extra")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
