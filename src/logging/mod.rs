//! Structured logging helpers
//!
//! Filter construction for the tracing subscriber and request-ID tagging for
//! HTTP requests.

pub mod middleware;

pub use middleware::{generate_request_id, UuidRequestId, REQUEST_ID_HEADER};

/// Build filter directives string from LoggingConfig
///
/// Produces the base level followed by one `healthsim::{component}={level}`
/// directive per configured component, sorted by component name.
///
/// # Examples
///
/// ```
/// use healthsim::config::{LogFormat, LoggingConfig};
/// use healthsim::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("health".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,healthsim::health=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",healthsim::{}={}", component, level));
        }
    }

    filter_str
}
