//! Request/response types for the probe, control and status endpoints.

use crate::health::{DenyReason, HealthConfig, ProbeVerdict};
use crate::metadata::InstanceMetadata;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Probe status as reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Healthy,
    Unhealthy,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResponse {
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
    /// Present on `random_failure` denials
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_percent: Option<u8>,
    #[serde(flatten)]
    pub metadata: InstanceMetadata,
}

impl ProbeResponse {
    pub fn new(verdict: ProbeVerdict, config: &HealthConfig, metadata: InstanceMetadata) -> Self {
        match verdict {
            ProbeVerdict::Allow => Self {
                status: ProbeStatus::Healthy,
                reason: None,
                readiness_percent: None,
                metadata,
            },
            ProbeVerdict::Deny(reason) => Self {
                status: ProbeStatus::Unhealthy,
                reason: Some(reason),
                readiness_percent: (reason == DenyReason::RandomFailure)
                    .then_some(config.readiness_percent),
                metadata,
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.status {
            ProbeStatus::Healthy => StatusCode::OK,
            ProbeStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ProbeResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Body of `POST /set_health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetHealthResponse {
    pub message: String,
    pub healthy: bool,
    #[serde(flatten)]
    pub metadata: InstanceMetadata,
}

impl SetHealthResponse {
    pub fn new(healthy: bool, metadata: InstanceMetadata) -> Self {
        let label = if healthy { "healthy" } else { "unhealthy" };
        Self {
            message: format!("Health set to {}", label),
            healthy,
            metadata,
        }
    }
}

/// Body of `POST /set_readiness`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetReadinessResponse {
    pub message: String,
    pub readiness_percent: u8,
    #[serde(flatten)]
    pub metadata: InstanceMetadata,
}

impl SetReadinessResponse {
    pub fn new(readiness_percent: u8, metadata: InstanceMetadata) -> Self {
        Self {
            message: format!("Readiness percent set to {}%", readiness_percent),
            readiness_percent,
            metadata,
        }
    }
}

/// Body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub healthy: bool,
    pub readiness_percent: u8,
    pub last_updated: DateTime<Utc>,
    pub startup_time: DateTime<Utc>,
    #[serde(flatten)]
    pub metadata: InstanceMetadata,
}

impl StatusResponse {
    pub fn new(config: HealthConfig, metadata: InstanceMetadata) -> Self {
        Self {
            healthy: config.healthy,
            readiness_percent: config.readiness_percent,
            last_updated: config.last_updated,
            startup_time: config.startup_time,
            metadata,
        }
    }
}
