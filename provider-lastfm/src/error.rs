//! Error types for the Last.fm provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Last.fm provider errors
#[derive(Error, Debug)]
pub enum LastFmError {
    /// No API key configured
    #[error("Last.fm API key is missing")]
    MissingApiKey,

    /// The API key was rejected (error codes 10 and 26)
    #[error("Last.fm rejected the API key: {0}")]
    InvalidApiKey(String),

    /// Last.fm reported an error inside a 200 response
    #[error("Last.fm API error {code}: {message}")]
    ApiError { code: i32, message: String },

    /// Non-success HTTP status
    #[error("Last.fm HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// Rate limit exceeded (HTTP 429 or error code 29)
    #[error("Last.fm rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    /// Failed to parse API response
    #[error("Failed to parse Last.fm response: {0}")]
    ParseError(String),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Result type for Last.fm operations
pub type Result<T> = std::result::Result<T, LastFmError>;

impl From<LastFmError> for BridgeError {
    fn from(error: LastFmError) -> Self {
        match error {
            LastFmError::MissingApiKey => BridgeError::NotAvailable(error.to_string()),
            LastFmError::InvalidApiKey(_) => BridgeError::Http {
                status: 403,
                message: error.to_string(),
            },
            LastFmError::HttpError { status, body } => BridgeError::Http {
                status,
                message: body,
            },
            LastFmError::RateLimited { .. } => BridgeError::Http {
                status: 429,
                message: error.to_string(),
            },
            LastFmError::ApiError { .. } | LastFmError::ParseError(_) => {
                BridgeError::OperationFailed(error.to_string())
            }
            LastFmError::Bridge(e) => e,
        }
    }
}
