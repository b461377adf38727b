use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Discovery error: {0}")]
    Discovery(#[from] core_discovery::DiscoveryError),

    #[error("Last.fm provider error: {0}")]
    LastFm(#[from] provider_lastfm::LastFmError),

    #[cfg(feature = "video")]
    #[error("YouTube provider error: {0}")]
    YouTube(#[from] provider_youtube::YouTubeError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
