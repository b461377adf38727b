use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Caller-visible failures of the discovery operations.
///
/// Only hard failures surface here. Per-item soft failures (one candidate
/// that cannot be resolved, a failed liked-check, one artist without tags)
/// are absorbed where they happen, and "nothing found" is an empty `Ok`.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Recommendation failed: {0}")]
    RecommendationFailed(#[source] BridgeError),

    #[error("Taste analysis failed: {0}")]
    AnalysisFailed(#[source] BridgeError),

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not configured")]
    ProviderNotConfigured(String),

    #[error("Lookup failed: {0}")]
    LookupFailed(#[source] BridgeError),
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
