//! Status endpoint handler.

use super::types::StatusResponse;
use crate::api::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// GET /status - Full health configuration plus instance metadata.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let config = state.health.status();
    let metadata = state.metadata.resolve().await;
    Json(StatusResponse::new(config, metadata))
}
