//! # HTTP API
//!
//! Probe, control and status endpoints over the shared [`HealthState`].
//!
//! ## Endpoints
//!
//! - `GET /` - HTML control page
//! - `GET /health` - Readiness probe (200 or 503)
//! - `POST /set_health?healthy=..` - Set the explicit health flag
//! - `POST /set_readiness?percent=..` - Set the readiness percentage
//! - `GET /status` - Current configuration
//! - `GET /metrics` - Prometheus metrics
//! - `GET /stats` - JSON probe counters
//!
//! Every JSON response carries `region`, `service` and `instance`, resolved
//! after the health state has been read or written so no lock is held while
//! the metadata server is queried.
//!
//! ## Example
//!
//! ```no_run
//! use healthsim::api::{create_router, AppState};
//! use healthsim::config::HealthsimConfig;
//! use healthsim::health::HealthState;
//! use healthsim::metadata::ResolverChain;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(HealthsimConfig::default());
//! let health = Arc::new(HealthState::new());
//! let metadata = Arc::new(ResolverChain::from_config(&config.metadata)?);
//!
//! let state = Arc::new(AppState::new(health, metadata, config));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod control;
mod probe;
mod status;
pub mod types;

pub use types::*;

use crate::config::HealthsimConfig;
use crate::health::HealthState;
use crate::logging::{UuidRequestId, REQUEST_ID_HEADER};
use crate::metadata::ResolverChain;
use crate::metrics::MetricsCollector;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub health: Arc<HealthState>,
    pub metadata: Arc<ResolverChain>,
    pub config: Arc<HealthsimConfig>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    /// Metrics collector for observability
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    pub fn new(
        health: Arc<HealthState>,
        metadata: Arc<ResolverChain>,
        config: Arc<HealthsimConfig>,
    ) -> Self {
        let start_time = Instant::now();

        // A second AppState in the same process (tests) cannot install the
        // global recorder again.
        let prometheus_handle = crate::metrics::setup_metrics().unwrap_or_else(|e| {
            tracing::debug!("Metrics already initialized, using detached handle: {}", e);
            crate::metrics::detached_handle()
        });

        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(&health),
            start_time,
            prometheus_handle,
        ));

        Self {
            health,
            metadata,
            config,
            start_time,
            metrics_collector,
        }
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .route("/", get(crate::dashboard::dashboard_handler))
        .route("/assets/*path", get(crate::dashboard::assets_handler))
        .route("/health", get(probe::handle))
        .route("/set_health", post(control::set_health))
        .route("/set_readiness", post(control::set_readiness))
        .route("/status", get(status::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .route("/stats", get(crate::metrics::handler::stats_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(timeout))
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER)),
        )
        .with_state(state)
}
