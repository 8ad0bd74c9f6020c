//! # Metrics Collection Module
//!
//! Probe and control-plane metrics, exported for Prometheus and as JSON.
//!
//! ## Endpoints
//!
//! - `GET /metrics` - Prometheus text format metrics
//! - `GET /stats` - JSON probe counters
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `healthsim_probes_total{result, reason}` - Probe verdicts
//! - `healthsim_mutations_total{operation}` - Control calls
//!
//! **Gauges:**
//! - `healthsim_healthy` - Current health flag (0 or 1)
//! - `healthsim_readiness_percent` - Current readiness percentage
//! - `healthsim_uptime_seconds` - Seconds since startup

pub mod handler;
pub mod types;

pub use types::*;

pub use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::{DenyReason, HealthState, ProbeVerdict};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Control operations counted in `healthsim_mutations_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    SetHealthy,
    SetReadiness,
}

impl Mutation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mutation::SetHealthy => "set_healthy",
            Mutation::SetReadiness => "set_readiness",
        }
    }
}

/// Records probe outcomes and derives state gauges from [`HealthState`].
pub struct MetricsCollector {
    health: Arc<HealthState>,
    start_time: Instant,
    allowed: AtomicU64,
    random_failures: AtomicU64,
    manual_denials: AtomicU64,
    mutations: AtomicU64,
    prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        health: Arc<HealthState>,
        start_time: Instant,
        prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        Self {
            health,
            start_time,
            allowed: AtomicU64::new(0),
            random_failures: AtomicU64::new(0),
            manual_denials: AtomicU64::new(0),
            mutations: AtomicU64::new(0),
            prometheus_handle,
        }
    }

    /// Count one probe verdict.
    pub fn record_probe(&self, verdict: ProbeVerdict) {
        match verdict {
            ProbeVerdict::Allow => {
                self.allowed.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("healthsim_probes_total",
                    "result" => "allow",
                    "reason" => "none"
                )
                .increment(1);
            }
            ProbeVerdict::Deny(reason) => {
                let counter = match reason {
                    DenyReason::RandomFailure => &self.random_failures,
                    DenyReason::ManuallySetUnhealthy => &self.manual_denials,
                };
                counter.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("healthsim_probes_total",
                    "result" => "deny",
                    "reason" => reason.as_str()
                )
                .increment(1);
            }
        }
    }

    /// Count one control call.
    pub fn record_mutation(&self, mutation: Mutation) {
        self.mutations.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("healthsim_mutations_total", "operation" => mutation.as_str())
            .increment(1);
    }

    /// Refresh gauges from the current health state.
    pub fn update_state_gauges(&self) {
        let status = self.health.status();
        metrics::gauge!("healthsim_healthy").set(if status.healthy { 1.0 } else { 0.0 });
        metrics::gauge!("healthsim_readiness_percent").set(f64::from(status.readiness_percent));
        metrics::gauge!("healthsim_uptime_seconds").set(self.uptime_seconds() as f64);
    }

    /// Seconds since startup.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Snapshot of the in-process counters.
    pub fn stats(&self) -> StatsResponse {
        StatsResponse {
            uptime_seconds: self.uptime_seconds(),
            probes: ProbeStats::new(
                self.allowed.load(Ordering::Relaxed),
                self.random_failures.load(Ordering::Relaxed),
                self.manual_denials.load(Ordering::Relaxed),
            ),
            mutations: self.mutations.load(Ordering::Relaxed),
        }
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Install the global Prometheus recorder.
///
/// Fails if a recorder is already installed; callers that may run more than
/// once (tests) fall back to [`detached_handle`].
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(handle)
}

/// Handle backed by a recorder that is not installed globally.
pub fn detached_handle() -> metrics_exporter_prometheus::PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
