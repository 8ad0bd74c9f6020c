//! Integration tests for the probe, control and status endpoints.

mod common;

use axum::http::StatusCode;
use common::*;

#[tokio::test]
async fn test_fresh_instance_passes_probe() {
    let (mut app, _state) = make_app(1);

    let response = get(&mut app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["region"], TEST_REGION);
    assert_eq!(body["service"], TEST_SERVICE);
    assert_eq!(body["instance"], TEST_INSTANCE);
    assert!(body.get("reason").is_none());
}

#[tokio::test]
async fn test_manual_unhealthy_then_recover() {
    let (mut app, _state) = make_app(1);

    let response = post(&mut app, "/set_health?healthy=false").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Health set to unhealthy");
    assert_eq!(body["healthy"], false);
    assert_eq!(body["region"], TEST_REGION);

    for _ in 0..20 {
        let response = get(&mut app, "/health").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["reason"], "manually_set_unhealthy");
        assert!(body.get("readiness_percent").is_none());
    }

    let body = body_json(post(&mut app, "/set_health?healthy=true").await).await;
    assert_eq!(body["message"], "Health set to healthy");

    let response = get(&mut app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_degraded_readiness_fails_some_probes() {
    let (mut app, _state) = make_app(42);

    let body = body_json(post(&mut app, "/set_readiness?percent=50").await).await;
    assert_eq!(body["message"], "Readiness percent set to 50%");
    assert_eq!(body["readiness_percent"], 50);

    let mut denied = 0;
    for _ in 0..1000 {
        let response = get(&mut app, "/health").await;
        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            let body = body_json(response).await;
            assert_eq!(body["reason"], "random_failure");
            assert_eq!(body["readiness_percent"], 50);
            denied += 1;
        } else {
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    assert!(
        (400..=600).contains(&denied),
        "expected roughly half of probes denied, got {}",
        denied
    );
}

#[tokio::test]
async fn test_zero_readiness_denies_every_probe() {
    let (mut app, _state) = make_app(3);
    post(&mut app, "/set_readiness?percent=0").await;

    for _ in 0..50 {
        let body = body_json(get(&mut app, "/health").await).await;
        assert_eq!(body["reason"], "random_failure");
    }
}

#[tokio::test]
async fn test_random_failure_checked_before_manual_flag() {
    let (mut app, _state) = make_app(3);
    post(&mut app, "/set_health?healthy=false").await;
    post(&mut app, "/set_readiness?percent=0").await;

    let body = body_json(get(&mut app, "/health").await).await;
    assert_eq!(body["reason"], "random_failure");
}

#[tokio::test]
async fn test_readiness_is_clamped() {
    let (mut app, _state) = make_app(1);

    let body = body_json(post(&mut app, "/set_readiness?percent=999").await).await;
    assert_eq!(body["readiness_percent"], 100);
    assert_eq!(body["message"], "Readiness percent set to 100%");

    let body = body_json(post(&mut app, "/set_readiness?percent=-5").await).await;
    assert_eq!(body["readiness_percent"], 0);
}

#[tokio::test]
async fn test_malformed_readiness_resets_to_full() {
    let (mut app, _state) = make_app(1);
    post(&mut app, "/set_readiness?percent=30").await;

    let response = post(&mut app, "/set_readiness?percent=abc").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["readiness_percent"], 100);

    let body = body_json(post(&mut app, "/set_readiness").await).await;
    assert_eq!(body["readiness_percent"], 100);
}

#[tokio::test]
async fn test_set_health_value_parsing() {
    let (mut app, state) = make_app(1);

    for (value, expected) in [
        ("TRUE", true),
        ("1", true),
        ("yes", true),
        ("no", false),
        ("0", false),
        ("banana", false),
    ] {
        let uri = format!("/set_health?healthy={}", value);
        let body = body_json(post(&mut app, &uri).await).await;
        assert_eq!(body["healthy"], expected, "value {:?}", value);
        assert_eq!(state.health.status().healthy, expected);
    }

    post(&mut app, "/set_health?healthy=false").await;
    let body = body_json(post(&mut app, "/set_health").await).await;
    assert_eq!(body["healthy"], true);
}

#[tokio::test]
async fn test_status_reflects_mutations() {
    let (mut app, _state) = make_app(1);

    let before = body_json(get(&mut app, "/status").await).await;
    assert_eq!(before["healthy"], true);
    assert_eq!(before["readiness_percent"], 100);
    assert_eq!(before["service"], TEST_SERVICE);

    post(&mut app, "/set_readiness?percent=35").await;
    post(&mut app, "/set_health?healthy=false").await;

    let after = body_json(get(&mut app, "/status").await).await;
    assert_eq!(after["healthy"], false);
    assert_eq!(after["readiness_percent"], 35);
    assert_eq!(after["startup_time"], before["startup_time"]);

    let before_ts: chrono::DateTime<chrono::Utc> =
        before["last_updated"].as_str().unwrap().parse().unwrap();
    let after_ts: chrono::DateTime<chrono::Utc> =
        after["last_updated"].as_str().unwrap().parse().unwrap();
    assert!(after_ts >= before_ts);
}

#[tokio::test]
async fn test_probe_does_not_touch_last_updated() {
    let (mut app, _state) = make_app(1);
    let before = body_json(get(&mut app, "/status").await).await;

    for _ in 0..10 {
        get(&mut app, "/health").await;
    }

    let after = body_json(get(&mut app, "/status").await).await;
    assert_eq!(before["last_updated"], after["last_updated"]);
}

#[tokio::test]
async fn test_control_endpoints_require_post() {
    let (mut app, _state) = make_app(1);

    let response = get(&mut app, "/set_health?healthy=false").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response = get(&mut app, "/set_readiness?percent=10").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let (mut app, _state) = make_app(1);

    let response = get(&mut app, "/health").await;
    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("x-request-id header")
        .to_str()
        .unwrap();
    assert_eq!(request_id.len(), UUID_V4_STRING_LEN);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::Service;

    let (mut app, _state) = make_app(1);

    let request = Request::builder()
        .uri("/status")
        .header("x-request-id", "probe-run-7")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();

    assert_eq!(response.headers()["x-request-id"], "probe-run-7");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (mut app, _state) = make_app(1);
    let response = get(&mut app, "/readyz").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Metadata resolution runs outside the health lock
// ---------------------------------------------------------------------------

mod slow_metadata {
    use super::common::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use healthsim::api::{create_router, AppState};
    use healthsim::config::HealthsimConfig;
    use healthsim::health::{DenyReason, HealthState, ProbeVerdict};
    use healthsim::metadata::{MetadataError, MetadataSource, ResolverChain};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tower::Service;

    /// Region lookup that blocks until released.
    struct GatedRegion {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl MetadataSource for GatedRegion {
        fn name(&self) -> &str {
            "gated"
        }

        async fn region(&self) -> Result<Option<String>, MetadataError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(Some("gated-region".to_string()))
        }
    }

    fn gated_app() -> (axum::Router, Arc<AppState>, Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let metadata = ResolverChain::new().with_source(Arc::new(GatedRegion {
            entered: Arc::clone(&entered),
            release: Arc::clone(&release),
        }));

        let state = Arc::new(AppState::new(
            Arc::new(HealthState::with_seed(5)),
            Arc::new(metadata),
            Arc::new(HealthsimConfig::default()),
        ));
        (create_router(Arc::clone(&state)), state, entered, release)
    }

    async fn wait_for_lookup(entered: &Notify) {
        tokio::time::timeout(Duration::from_secs(2), entered.notified())
            .await
            .expect("metadata lookup never started");
    }

    /// Health operations from another thread must finish while a handler is
    /// parked inside metadata resolution.
    async fn health_ops_complete(state: &Arc<AppState>) {
        let health = Arc::clone(&state.health);
        let ops = tokio::task::spawn_blocking(move || {
            health.set_healthy(false);
            let verdict = health.probe();
            health.set_readiness(60);
            (verdict, health.status())
        });

        let (verdict, status) = tokio::time::timeout(Duration::from_secs(2), ops)
            .await
            .expect("health state blocked while metadata was resolving")
            .unwrap();
        assert_eq!(verdict, ProbeVerdict::Deny(DenyReason::ManuallySetUnhealthy));
        assert!(!status.healthy);
        assert_eq!(status.readiness_percent, 60);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_health_state_usable_during_slow_health_response() {
        let (app, state, entered, release) = gated_app();

        let mut pending_app = app.clone();
        let pending = tokio::spawn(async move {
            let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
            pending_app.call(request).await.unwrap()
        });

        wait_for_lookup(&entered).await;
        health_ops_complete(&state).await;
        assert!(!pending.is_finished());

        release.notify_one();
        let response = pending.await.unwrap();

        // The verdict was taken before the lookup, when the instance was healthy
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["region"], "gated-region");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_health_state_usable_during_slow_control_response() {
        let (app, state, entered, release) = gated_app();

        let mut pending_app = app.clone();
        let pending = tokio::spawn(async move {
            let request = Request::builder()
                .method("POST")
                .uri("/set_health?healthy=true")
                .body(Body::empty())
                .unwrap();
            pending_app.call(request).await.unwrap()
        });

        wait_for_lookup(&entered).await;
        health_ops_complete(&state).await;

        release.notify_one();
        let body = body_json(pending.await.unwrap()).await;
        assert_eq!(body["message"], "Health set to healthy");
        assert_eq!(body["region"], "gated-region");
    }
}
