//! Concrete metadata sources.

use super::config::MetadataConfig;
use super::error::MetadataError;
use super::MetadataSource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

/// Region path on the GCE/Cloud Run metadata server.
pub const REGION_PATH: &str = "/computeMetadata/v1/instance/region";

/// Values fixed at startup, normally from the `[metadata]` config section.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    region: Option<String>,
    service: Option<String>,
    instance: Option<String>,
}

impl StaticSource {
    pub fn new(
        region: Option<String>,
        service: Option<String>,
        instance: Option<String>,
    ) -> Self {
        Self {
            region,
            service,
            instance,
        }
    }

    pub fn from_config(config: &MetadataConfig) -> Self {
        Self::new(
            config.region.clone(),
            config.service.clone(),
            config.instance.clone(),
        )
    }
}

#[async_trait]
impl MetadataSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn region(&self) -> Result<Option<String>, MetadataError> {
        Ok(self.region.clone())
    }

    async fn service(&self) -> Result<Option<String>, MetadataError> {
        Ok(self.service.clone())
    }

    async fn instance(&self) -> Result<Option<String>, MetadataError> {
        Ok(self.instance.clone())
    }
}

/// Variables read by [`EnvSource::from_env`].
const ENV_KEYS: [&str; 4] = ["CLOUD_RUN_REGION", "K_SERVICE", "K_REVISION", "HOSTNAME"];

/// Cloud Run environment variables.
///
/// - region: `CLOUD_RUN_REGION`
/// - service: `K_SERVICE`
/// - instance: `K_REVISION` + `-` + first 8 characters of the hostname
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
    hostname: Option<String>,
}

impl EnvSource {
    /// Capture the relevant variables from the process environment.
    pub fn from_env() -> Self {
        let vars: Vec<(String, String)> = ENV_KEYS
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();
        let hostname = std::fs::read_to_string("/etc/hostname")
            .ok()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());
        Self::from_vars(vars).with_hostname_fallback(hostname)
    }

    /// Build from an explicit variable set.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let hostname = vars.get("HOSTNAME").cloned().filter(|h| !h.is_empty());
        Self { vars, hostname }
    }

    fn with_hostname_fallback(mut self, hostname: Option<String>) -> Self {
        if self.hostname.is_none() {
            self.hostname = hostname;
        }
        self
    }

    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

#[async_trait]
impl MetadataSource for EnvSource {
    fn name(&self) -> &str {
        "env"
    }

    async fn region(&self) -> Result<Option<String>, MetadataError> {
        Ok(self.var("CLOUD_RUN_REGION"))
    }

    async fn service(&self) -> Result<Option<String>, MetadataError> {
        Ok(self.var("K_SERVICE"))
    }

    async fn instance(&self) -> Result<Option<String>, MetadataError> {
        Ok(self.var("K_REVISION").map(|revision| {
            let host: String = self
                .hostname
                .as_deref()
                .unwrap_or("unknown")
                .chars()
                .take(8)
                .collect();
            format!("{}-{}", revision, host)
        }))
    }
}

/// GCE/Cloud Run metadata server. Supplies the region only.
///
/// A successful lookup is remembered; failures are retried on the next call.
#[derive(Debug)]
pub struct GceMetadataSource {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
    region: OnceLock<String>,
}

impl GceMetadataSource {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self, MetadataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| MetadataError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_ms,
            region: OnceLock::new(),
        })
    }

    pub fn from_config(config: &MetadataConfig) -> Result<Self, MetadataError> {
        Self::new(config.metadata_url.clone(), config.timeout_ms)
    }

    async fn fetch_region(&self) -> Result<String, MetadataError> {
        let url = format!("{}{}", self.base_url, REGION_PATH);
        let response = self
            .client
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| Self::classify_error(e, self.timeout_ms))?;

        if !response.status().is_success() {
            return Err(MetadataError::HttpError(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Self::classify_error(e, self.timeout_ms))?;
        parse_region(&body)
    }

    fn classify_error(e: reqwest::Error, timeout_ms: u64) -> MetadataError {
        if e.is_timeout() {
            MetadataError::Timeout(timeout_ms)
        } else {
            MetadataError::ConnectionFailed(e.to_string())
        }
    }
}

#[async_trait]
impl MetadataSource for GceMetadataSource {
    fn name(&self) -> &str {
        "gce"
    }

    async fn region(&self) -> Result<Option<String>, MetadataError> {
        if let Some(region) = self.region.get() {
            return Ok(Some(region.clone()));
        }
        let region = self.fetch_region().await?;
        Ok(Some(self.region.get_or_init(|| region).clone()))
    }
}

/// Extract the region from `projects/NUMBER/regions/REGION`.
pub fn parse_region(body: &str) -> Result<String, MetadataError> {
    body.trim()
        .rsplit('/')
        .next()
        .map(str::trim)
        .filter(|region| !region.is_empty())
        .map(str::to_string)
        .ok_or(MetadataError::EmptyResponse)
}
