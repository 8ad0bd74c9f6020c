//! Simulated health and readiness state.
//!
//! [`HealthState`] owns the single process-wide [`HealthConfig`] and decides
//! every readiness probe. Two mutations (`set_healthy`, `set_readiness`), one
//! probe and one status read are exposed; none of them can fail.
//!
//! # Probe decision
//!
//! Checks run in a fixed order, first match wins:
//!
//! 1. `readiness_percent < 100`: draw an integer in `1..=100`; a draw above the
//!    percentage denies with `random_failure`, even while `healthy` is true.
//! 2. `healthy == false`: deny with `manually_set_unhealthy`.
//! 3. Otherwise allow.
//!
//! # Example
//!
//! ```
//! use healthsim::health::{DenyReason, HealthState, ProbeVerdict};
//!
//! let state = HealthState::with_seed(7);
//! assert_eq!(state.probe(), ProbeVerdict::Allow);
//!
//! state.set_healthy(false);
//! assert_eq!(state.probe(), ProbeVerdict::Deny(DenyReason::ManuallySetUnhealthy));
//!
//! let snapshot = state.set_readiness(999);
//! assert_eq!(snapshot.readiness_percent, 100);
//! ```

mod config;
mod parser;
mod state;


pub use config::*;
pub use parser::*;
pub use state::*;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Process-wide health state shared by every handler.
///
/// All fields of [`HealthConfig`] are written under one write guard, so readers
/// never observe `healthy` from one update paired with `readiness_percent`
/// from another.
pub struct HealthState {
    config: RwLock<HealthConfig>,
    /// Degraded-mode random source, locked separately from `config`
    rng: Mutex<StdRng>,
}

impl HealthState {
    /// Default state (`healthy = true`, `readiness_percent = 100`) with an
    /// entropy-seeded random source.
    pub fn new() -> Self {
        Self::build(StdRng::from_entropy(), true, i64::from(MAX_READINESS_PERCENT))
    }

    /// Default state with a deterministic random source.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(
            StdRng::seed_from_u64(seed),
            true,
            i64::from(MAX_READINESS_PERCENT),
        )
    }

    /// Custom initial values with an entropy-seeded random source.
    ///
    /// `readiness_percent` is clamped like any other write.
    pub fn with_initial(healthy: bool, readiness_percent: i64) -> Self {
        Self::build(StdRng::from_entropy(), healthy, readiness_percent)
    }

    /// Build the state described by the `[health]` config section.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::build(
            rng,
            config.initial_healthy,
            i64::from(config.initial_readiness_percent),
        )
    }

    fn build(rng: StdRng, healthy: bool, readiness_percent: i64) -> Self {
        Self {
            config: RwLock::new(HealthConfig::new(
                healthy,
                clamp_percent(readiness_percent),
                Utc::now(),
            )),
            rng: Mutex::new(rng),
        }
    }

    /// Set the explicit health flag and return the resulting configuration.
    pub fn set_healthy(&self, healthy: bool) -> HealthConfig {
        let snapshot = {
            let mut config = self.write();
            config.healthy = healthy;
            config.last_updated = Utc::now();
            config.clone()
        };

        tracing::info!(healthy, "Health flag updated");
        snapshot
    }

    /// Set the readiness percentage, clamped to `[0, 100]`, and return the
    /// resulting configuration.
    pub fn set_readiness(&self, percent: i64) -> HealthConfig {
        let clamped = clamp_percent(percent);
        let snapshot = {
            let mut config = self.write();
            config.readiness_percent = clamped;
            config.last_updated = Utc::now();
            config.clone()
        };

        if i64::from(clamped) != percent {
            tracing::debug!(requested = percent, applied = clamped, "Readiness percent clamped");
        }
        tracing::info!(readiness_percent = clamped, "Readiness percent updated");
        snapshot
    }

    /// Decide a readiness probe.
    pub fn probe(&self) -> ProbeVerdict {
        self.probe_with_snapshot().0
    }

    /// Decide a readiness probe and return the configuration it was decided on.
    pub fn probe_with_snapshot(&self) -> (ProbeVerdict, HealthConfig) {
        let snapshot = self.status();
        let verdict = self.decide(&snapshot);

        if let ProbeVerdict::Deny(reason) = verdict {
            tracing::debug!(
                reason = reason.as_str(),
                readiness_percent = snapshot.readiness_percent,
                healthy = snapshot.healthy,
                "Probe denied"
            );
        }

        (verdict, snapshot)
    }

    /// Current configuration. No side effects.
    pub fn status(&self) -> HealthConfig {
        self.read().clone()
    }

    fn decide(&self, config: &HealthConfig) -> ProbeVerdict {
        if config.is_degraded() {
            let draw: u8 = self.rng().gen_range(1..=MAX_READINESS_PERCENT);
            if draw > config.readiness_percent {
                return ProbeVerdict::Deny(DenyReason::RandomFailure);
            }
        }

        if !config.healthy {
            return ProbeVerdict::Deny(DenyReason::ManuallySetUnhealthy);
        }

        ProbeVerdict::Allow
    }

    // Every write leaves the config whole, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HealthConfig> {
        self.config.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Health config lock poisoned on read, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HealthConfig> {
        self.config.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Health config lock poisoned on write, recovering");
            poisoned.into_inner()
        })
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Probe RNG lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}
