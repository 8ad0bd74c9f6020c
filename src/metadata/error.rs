//! Error types for metadata resolution.

use thiserror::Error;

/// Errors a metadata source can report.
///
/// These never reach callers of [`super::ResolverChain::resolve`]; the chain
/// logs them and moves on to the next source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    /// Request timeout
    #[error("metadata request timed out after {0}ms")]
    Timeout(u64),

    /// Connection failed (includes DNS failures off-cloud)
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Metadata server answered with a non-success status
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Metadata server answered with an empty value
    #[error("empty metadata response")]
    EmptyResponse,

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
