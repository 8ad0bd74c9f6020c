//! Shared test utilities for healthsim integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use healthsim::api::{create_router, AppState};
use healthsim::config::HealthsimConfig;
use healthsim::health::HealthState;
use healthsim::metadata::ResolverChain;
use std::sync::Arc;
use tower::Service;

/// UUID v4 string length: "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"
pub const UUID_V4_STRING_LEN: usize = 36;

pub const TEST_REGION: &str = "us-central1";
pub const TEST_SERVICE: &str = "checkout";
pub const TEST_INSTANCE: &str = "checkout-00001-a1b2c3d4";

/// App state with fixed metadata and a seeded random source.
pub fn make_state(seed: u64) -> Arc<AppState> {
    let config = Arc::new(HealthsimConfig::default());
    let health = Arc::new(HealthState::with_seed(seed));
    let metadata = Arc::new(ResolverChain::fixed(
        TEST_REGION,
        TEST_SERVICE,
        TEST_INSTANCE,
    ));
    Arc::new(AppState::new(health, metadata, config))
}

/// Router plus the state behind it.
pub fn make_app(seed: u64) -> (axum::Router, Arc<AppState>) {
    let state = make_state(seed);
    (create_router(Arc::clone(&state)), state)
}

pub async fn get(app: &mut axum::Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.call(request).await.unwrap()
}

pub async fn post(app: &mut axum::Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.call(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
