//! Configuration module for healthsim
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`HEALTHSIM_*`, plus Cloud Run's `PORT`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use healthsim::config::HealthsimConfig;
//!
//! let config = HealthsimConfig::default();
//! assert_eq!(config.server.port, 8080);
//!
//! let toml = r#"
//! [server]
//! port = 9000
//!
//! [health]
//! initial_readiness_percent = 70
//! "#;
//! let config: HealthsimConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.server.port, 9000);
//! assert_eq!(config.health.initial_readiness_percent, 70);
//! ```

pub mod error;
pub mod logging;
pub mod server;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;

pub use crate::health::SimulationConfig;
pub use crate::metadata::MetadataConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Commented example configuration written by `healthsim config init`.
pub const EXAMPLE_CONFIG: &str = include_str!("../../healthsim.example.toml");

/// Unified configuration for the healthsim server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HealthsimConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Initial simulated health state
    pub health: SimulationConfig,
    /// Region/service/instance resolution
    pub metadata: MetadataConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl HealthsimConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Invalid values are ignored and the current value is kept. `PORT` is
    /// applied after `HEALTHSIM_PORT` because Cloud Run injects it.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ["HEALTHSIM_PORT", "PORT"] {
            if let Some(port) = lookup(key).and_then(|p| p.parse().ok()) {
                self.server.port = port;
            }
        }
        if let Some(host) = lookup("HEALTHSIM_HOST") {
            self.server.host = host;
        }

        if let Some(level) = lookup("HEALTHSIM_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("HEALTHSIM_LOG_FORMAT").and_then(|f| f.parse().ok()) {
            self.logging.format = format;
        }

        if let Some(region) = lookup("HEALTHSIM_REGION").filter(|r| !r.is_empty()) {
            self.metadata.region = Some(region);
        }
        if let Some(service) = lookup("HEALTHSIM_SERVICE").filter(|s| !s.is_empty()) {
            self.metadata.service = Some(service);
        }
        if let Some(enabled) = lookup("HEALTHSIM_METADATA_SERVER") {
            self.metadata.metadata_enabled = enabled.to_lowercase() == "true";
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }

        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "server.request_timeout_seconds".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }

        if self.health.initial_readiness_percent > 100 {
            return Err(ConfigError::Validation {
                field: "health.initial_readiness_percent".to_string(),
                message: format!(
                    "must be between 0 and 100, got {}",
                    self.health.initial_readiness_percent
                ),
            });
        }

        if self.metadata.timeout_ms == 0 {
            return Err(ConfigError::Validation {
                field: "metadata.timeout_ms".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }

        if self.metadata.metadata_enabled && self.metadata.metadata_url.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "metadata.metadata_url".to_string(),
                message: "URL cannot be empty while the metadata server is enabled".to_string(),
            });
        }

        self.logging.validate()?;

        Ok(())
    }
}
