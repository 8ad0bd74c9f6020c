//! Metadata resolution configuration.

use serde::{Deserialize, Serialize};

/// Default GCE/Cloud Run metadata server.
pub const DEFAULT_METADATA_URL: &str = "http://metadata.google.internal";

/// `[metadata]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Explicit region; wins over every dynamic source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Explicit service name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Explicit instance identity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Query the metadata server for the region
    pub metadata_enabled: bool,
    /// Base URL of the metadata server
    pub metadata_url: String,
    /// Per-request timeout for the metadata server
    pub timeout_ms: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            region: None,
            service: None,
            instance: None,
            metadata_enabled: true,
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            timeout_ms: 1000,
        }
    }
}
