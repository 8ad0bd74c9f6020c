//! Operator control endpoints.
//!
//! Parameters are read as raw strings and normalized, so a malformed value
//! changes the state to a safe default instead of producing a 4xx.

use super::types::{SetHealthResponse, SetReadinessResponse};
use crate::api::AppState;
use crate::health::{parse_healthy, parse_readiness_percent};
use crate::metrics::Mutation;
use axum::extract::{Query, State};
use axum::Json;
use std::collections::HashMap;
use std::sync::Arc;

/// POST /set_health?healthy=true|false
pub async fn set_health(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<SetHealthResponse> {
    let healthy = parse_healthy(params.get("healthy").map(String::as_str));
    let snapshot = state.health.set_healthy(healthy);
    state.metrics_collector.record_mutation(Mutation::SetHealthy);

    let metadata = state.metadata.resolve().await;
    Json(SetHealthResponse::new(snapshot.healthy, metadata))
}

/// POST /set_readiness?percent=0..100
pub async fn set_readiness(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<SetReadinessResponse> {
    let percent = parse_readiness_percent(params.get("percent").map(String::as_str));
    let snapshot = state.health.set_readiness(percent);
    state.metrics_collector.record_mutation(Mutation::SetReadiness);

    let metadata = state.metadata.resolve().await;
    Json(SetReadinessResponse::new(snapshot.readiness_percent, metadata))
}
