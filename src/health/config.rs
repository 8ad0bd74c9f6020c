//! Startup settings for the simulated health state.

use serde::{Deserialize, Serialize};

/// `[health]` section: values the state starts with after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Initial value of the `healthy` flag
    pub initial_healthy: bool,
    /// Initial readiness percentage (0-100)
    pub initial_readiness_percent: u8,
    /// Fixed seed for the degraded-mode draw; entropy-seeded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_healthy: true,
            initial_readiness_percent: 100,
            rng_seed: None,
        }
    }
}
