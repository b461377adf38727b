//! Error types for the Spotify provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Spotify provider errors
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Access token missing, expired or revoked (HTTP 401)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Token lacks the required scope (HTTP 403)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    /// Any other non-success status
    #[error("Spotify API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Spotify operations
pub type Result<T> = std::result::Result<T, SpotifyError>;

impl SpotifyError {
    /// HTTP status this error corresponds to, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::RateLimitExceeded { .. } => Some(429),
            Self::ApiError { status_code, .. } => Some(*status_code),
            Self::BridgeError(e) => e.status(),
            Self::InvalidRequest(_) | Self::ParseError(_) => None,
        }
    }
}

impl From<SpotifyError> for BridgeError {
    fn from(error: SpotifyError) -> Self {
        match error {
            SpotifyError::BridgeError(e) => e,
            SpotifyError::InvalidRequest(_) | SpotifyError::ParseError(_) => {
                BridgeError::OperationFailed(error.to_string())
            }
            other => BridgeError::Http {
                status: other.status().unwrap_or(500),
                message: other.to_string(),
            },
        }
    }
}
