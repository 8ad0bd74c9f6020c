//! # Metrics Types
//!
//! Data structures for the JSON stats response.

use serde::{Deserialize, Serialize};

/// JSON response for `GET /stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Seconds since the process started
    pub uptime_seconds: u64,
    /// Probe verdict counts since startup
    pub probes: ProbeStats,
    /// Control-endpoint mutation count since startup
    pub mutations: u64,
}

/// Probe verdict counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeStats {
    pub total: u64,
    pub allowed: u64,
    pub random_failure: u64,
    pub manually_set_unhealthy: u64,
    /// Fraction of probes denied (0.0 when no probes were served)
    pub deny_rate: f64,
}

impl ProbeStats {
    pub fn new(allowed: u64, random_failure: u64, manually_set_unhealthy: u64) -> Self {
        let total = allowed + random_failure + manually_set_unhealthy;
        let deny_rate = if total == 0 {
            0.0
        } else {
            (random_failure + manually_set_unhealthy) as f64 / total as f64
        };
        Self {
            total,
            allowed,
            random_failure,
            manually_set_unhealthy,
            deny_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_stats_totals() {
        let stats = ProbeStats::new(6, 3, 1);
        assert_eq!(stats.total, 10);
        assert!((stats.deny_rate - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_probe_stats_empty() {
        let stats = ProbeStats::new(0, 0, 0);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.deny_rate, 0.0);
    }

    #[test]
    fn test_stats_response_serialization() {
        let response = StatsResponse {
            uptime_seconds: 12,
            probes: ProbeStats::new(1, 1, 0),
            mutations: 2,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["probes"]["random_failure"], 1);
        assert_eq!(json["mutations"], 2);
    }
}
