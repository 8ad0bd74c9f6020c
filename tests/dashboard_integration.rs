//! Integration tests for the HTML control page.

mod common;

use axum::http::StatusCode;
use common::*;

#[tokio::test]
async fn test_root_serves_control_page() {
    let (mut app, _state) = make_app(1);

    let response = get(&mut app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));

    let html = body_text(response).await;
    assert!(html.contains(TEST_REGION));
    assert!(html.contains(TEST_SERVICE));
    assert!(html.contains(TEST_INSTANCE));
    assert!(html.contains("HEALTHY"));
    assert!(!html.contains("UNHEALTHY"));
    assert!(html.contains("100%"));
    assert!(!html.contains("{{"));
}

#[tokio::test]
async fn test_control_page_reflects_state() {
    let (mut app, _state) = make_app(1);
    post(&mut app, "/set_health?healthy=false").await;
    post(&mut app, "/set_readiness?percent=35").await;

    let html = body_text(get(&mut app, "/").await).await;
    assert!(html.contains("UNHEALTHY"));
    assert!(html.contains("35%"));
}

#[tokio::test]
async fn test_control_page_does_not_probe() {
    let (mut app, _state) = make_app(1);
    get(&mut app, "/").await;

    let stats = body_json(get(&mut app, "/stats").await).await;
    assert_eq!(stats["probes"]["total"], 0);
}

#[tokio::test]
async fn test_assets_are_served() {
    let (mut app, _state) = make_app(1);

    let response = get(&mut app, "/assets/style.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/css"));

    let response = get(&mut app, "/assets/app.js").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&mut app, "/assets/missing.css").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
