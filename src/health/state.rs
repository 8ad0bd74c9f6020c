//! Health configuration snapshot and probe verdict types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest accepted readiness percentage.
pub const MIN_READINESS_PERCENT: u8 = 0;

/// Highest accepted readiness percentage. Also the default.
pub const MAX_READINESS_PERCENT: u8 = 100;

/// Point-in-time copy of the process-wide health configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Operator-set kill switch
    pub healthy: bool,
    /// Chance (in percent) that a probe passes the degraded-mode draw
    pub readiness_percent: u8,
    /// When the last mutation completed
    pub last_updated: DateTime<Utc>,
    /// When the state was created; never changes afterwards
    pub startup_time: DateTime<Utc>,
}

impl HealthConfig {
    /// Fresh configuration stamped with `now` for both timestamps.
    pub fn new(healthy: bool, readiness_percent: u8, now: DateTime<Utc>) -> Self {
        Self {
            healthy,
            readiness_percent,
            last_updated: now,
            startup_time: now,
        }
    }

    /// True when degraded mode is active and probes may fail randomly.
    pub fn is_degraded(&self) -> bool {
        self.readiness_percent < MAX_READINESS_PERCENT
    }
}

/// Clamp an arbitrary integer into `[0, 100]`.
pub fn clamp_percent(percent: i64) -> u8 {
    percent.clamp(
        i64::from(MIN_READINESS_PERCENT),
        i64::from(MAX_READINESS_PERCENT),
    ) as u8
}

/// Why a probe was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The degraded-mode draw exceeded `readiness_percent`
    RandomFailure,
    /// `healthy` was set to false by an operator
    ManuallySetUnhealthy,
}

impl DenyReason {
    /// Machine-readable reason string used on the wire and in metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::RandomFailure => "random_failure",
            DenyReason::ManuallySetUnhealthy => "manually_set_unhealthy",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeVerdict {
    Allow,
    Deny(DenyReason),
}

impl ProbeVerdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, ProbeVerdict::Allow)
    }

    /// Deny reason, if any.
    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            ProbeVerdict::Allow => None,
            ProbeVerdict::Deny(reason) => Some(*reason),
        }
    }
}
