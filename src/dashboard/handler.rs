//! HTTP handlers for dashboard routes

use askama::Template;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use rust_embed::RustEmbed;
use std::sync::Arc;

use crate::api::AppState;
use crate::health::HealthConfig;
use crate::metadata::InstanceMetadata;

/// Embedded static assets from dashboard/ directory
#[derive(RustEmbed)]
#[folder = "dashboard/"]
struct DashboardAssets;

/// Control page, rendered from `templates/index.html`.
#[derive(Template)]
#[template(path = "index.html")]
pub struct ControlPage<'a> {
    region: &'a str,
    service: &'a str,
    instance: &'a str,
    healthy: bool,
    readiness_percent: u8,
    last_updated: String,
    request_url: &'a str,
}

impl<'a> ControlPage<'a> {
    pub fn new(
        config: &HealthConfig,
        metadata: &'a InstanceMetadata,
        request_url: &'a str,
    ) -> Self {
        Self {
            region: &metadata.region,
            service: &metadata.service,
            instance: &metadata.instance,
            healthy: config.healthy,
            readiness_percent: config.readiness_percent,
            last_updated: config.last_updated.to_rfc3339(),
            request_url,
        }
    }
}

/// Serves the control page with the current state filled in
pub async fn dashboard_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let config = state.health.status();
    let metadata = state.metadata.resolve().await;
    let request_url = request_base_url(&headers);

    match ControlPage::new(&config, &metadata, &request_url).render() {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render control page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Dashboard render failed").into_response()
        }
    }
}

/// Serves static assets (CSS, JS)
pub async fn assets_handler(Path(path): Path<String>) -> Response {
    match DashboardAssets::get(&path) {
        Some(content) => {
            let mime_type = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime_type.as_ref())], content.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Asset not found").into_response(),
    }
}

/// Base URL the client used, for the example commands on the page.
fn request_base_url(headers: &HeaderMap) -> String {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let scheme = header_str("x-forwarded-proto").unwrap_or("http");
    let host = header_str(header::HOST.as_str()).unwrap_or("localhost");
    format!("{}://{}", scheme, host)
}
