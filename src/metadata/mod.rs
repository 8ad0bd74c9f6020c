//! Instance metadata used to decorate responses.
//!
//! Region, service and instance come from an ordered list of
//! [`MetadataSource`]s; the first non-empty answer wins and `"unknown"` is
//! used when every source comes up empty or fails. Resolution never fails
//! and never touches the health state.

mod config;
mod error;
mod sources;

pub use config::*;
pub use error::*;
pub use sources::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Value used for any field no source could supply.
pub const UNKNOWN: &str = "unknown";

/// Descriptive fields attached to every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMetadata {
    pub region: String,
    pub service: String,
    pub instance: String,
}

impl InstanceMetadata {
    /// All fields set to `"unknown"`.
    pub fn unknown() -> Self {
        Self {
            region: UNKNOWN.to_string(),
            service: UNKNOWN.to_string(),
            instance: UNKNOWN.to_string(),
        }
    }
}

/// One link in the resolution chain.
///
/// `Ok(None)` means "no opinion, ask the next source". The default methods
/// return `Ok(None)` so a source only implements the fields it knows.
#[async_trait]
pub trait MetadataSource: Send + Sync + 'static {
    /// Short name for logging.
    fn name(&self) -> &str;

    async fn region(&self) -> Result<Option<String>, MetadataError> {
        Ok(None)
    }

    async fn service(&self) -> Result<Option<String>, MetadataError> {
        Ok(None)
    }

    async fn instance(&self) -> Result<Option<String>, MetadataError> {
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Region,
    Service,
    Instance,
}

impl Field {
    fn as_str(&self) -> &'static str {
        match self {
            Field::Region => "region",
            Field::Service => "service",
            Field::Instance => "instance",
        }
    }
}

/// Ordered list of metadata sources.
#[derive(Clone, Default)]
pub struct ResolverChain {
    sources: Vec<Arc<dyn MetadataSource>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source; earlier sources take precedence.
    pub fn with_source(mut self, source: Arc<dyn MetadataSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Chain with a single static source, for tests and fixed deployments.
    pub fn fixed(region: &str, service: &str, instance: &str) -> Self {
        Self::new().with_source(Arc::new(StaticSource::new(
            Some(region.to_string()),
            Some(service.to_string()),
            Some(instance.to_string()),
        )))
    }

    /// Static config, then Cloud Run environment, then the metadata server
    /// (when enabled).
    pub fn from_config(config: &MetadataConfig) -> Result<Self, MetadataError> {
        let mut chain = Self::new()
            .with_source(Arc::new(StaticSource::from_config(config)))
            .with_source(Arc::new(EnvSource::from_env()));

        if config.metadata_enabled {
            chain = chain.with_source(Arc::new(GceMetadataSource::from_config(config)?));
        }

        Ok(chain)
    }

    /// Names of the sources in precedence order.
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Resolve all three fields.
    pub async fn resolve(&self) -> InstanceMetadata {
        let (region, service, instance) = tokio::join!(
            self.resolve_field(Field::Region),
            self.resolve_field(Field::Service),
            self.resolve_field(Field::Instance),
        );

        InstanceMetadata {
            region,
            service,
            instance,
        }
    }

    async fn resolve_field(&self, field: Field) -> String {
        for source in &self.sources {
            let result = match field {
                Field::Region => source.region().await,
                Field::Service => source.service().await,
                Field::Instance => source.instance().await,
            };

            match result {
                Ok(Some(value)) if !value.trim().is_empty() => return value,
                Ok(_) => {}
                Err(error) => {
                    tracing::debug!(
                        source = source.name(),
                        field = field.as_str(),
                        error = %error,
                        "Metadata source failed, trying next"
                    );
                }
            }
        }

        UNKNOWN.to_string()
    }
}
