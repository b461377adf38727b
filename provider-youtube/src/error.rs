//! Error types for the YouTube provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum YouTubeError {
    #[error("YouTube API key is missing")]
    MissingApiKey,

    /// Daily quota exhausted or key rejected (HTTP 403)
    #[error("YouTube quota exceeded or access denied: {0}")]
    QuotaExceeded(String),

    #[error("YouTube API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    #[error("Failed to parse YouTube response: {0}")]
    ParseError(String),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, YouTubeError>;

impl From<YouTubeError> for BridgeError {
    fn from(error: YouTubeError) -> Self {
        match error {
            YouTubeError::MissingApiKey => BridgeError::NotAvailable(error.to_string()),
            YouTubeError::QuotaExceeded(message) => BridgeError::Http {
                status: 403,
                message,
            },
            YouTubeError::ApiError {
                status_code,
                message,
            } => BridgeError::Http {
                status: status_code,
                message,
            },
            YouTubeError::ParseError(_) => BridgeError::OperationFailed(error.to_string()),
            YouTubeError::Bridge(e) => e,
        }
    }
}
