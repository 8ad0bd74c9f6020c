//! Readiness probe endpoint.

use super::types::ProbeResponse;
use crate::api::AppState;
use axum::extract::State;
use std::sync::Arc;

/// GET /health - 200 when the probe is allowed, 503 with a reason otherwise.
pub async fn handle(State(state): State<Arc<AppState>>) -> ProbeResponse {
    let (verdict, config) = state.health.probe_with_snapshot();
    state.metrics_collector.record_probe(verdict);

    let metadata = state.metadata.resolve().await;
    ProbeResponse::new(verdict, &config, metadata)
}
