//! # Core Configuration Module
//!
//! Provides configuration management for the taste discovery core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the HTTP bridge, the remote service credentials and the
//! tuning knobs of the discovery pipelines. It enforces fail-fast validation
//! so that a misconfigured host learns about it at startup, not on the first
//! recommendation request.
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//!
//! When the `desktop-shims` feature is enabled, the reqwest-backed client is
//! injected automatically if none was provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, ServiceApiConfig};
//!
//! let config = CoreConfig::builder()
//!     .service_api_config(ServiceApiConfig::from_env())
//!     .top_tags_limit(20)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::{CoreConfig, ServiceApiConfig};
//!
//! // Last.fm powers both pipelines, so a missing key is rejected
//! let config = CoreConfig::builder()
//!     .service_api_config(ServiceApiConfig::new())
//!     .build()
//!     .expect("Should fail - missing Last.fm key");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, TimeRange};
use std::sync::Arc;
use std::time::Duration;

/// Default number of tags returned by taste analysis
pub const DEFAULT_TOP_TAGS_LIMIT: usize = 30;

/// Default number of similarity candidates requested per seed
pub const DEFAULT_SIMILAR_LIMIT: u32 = 10;

/// Default number of top tracks used as taste seeds
pub const DEFAULT_TOP_TRACKS_LIMIT: u32 = 50;

/// Upper bound the streaming service accepts for top tracks
pub const MAX_TOP_TRACKS_LIMIT: u32 = 50;

/// Default per-call budget for external requests
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of catalog resolutions in flight at once
pub const DEFAULT_MAX_CONCURRENT_RESOLUTIONS: usize = 10;

/// Core configuration for the taste discovery core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// HTTP client for making API requests (optional with desktop default)
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Pipeline tuning
    pub discovery: DiscoveryConfig,

    /// External API credentials (Last.fm, YouTube)
    pub service_api_config: ServiceApiConfig,

    /// Features flags
    pub features: FeatureFlags,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("discovery", &self.discovery)
            .field("service_api_config", &self.service_api_config)
            .field("features", &self.features)
            .finish()
    }
}

/// Feature flags control optional functionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Annotate recommendations with the listener's liked status
    pub enable_liked_status: bool,

    /// Enable music video lookup (requires a YouTube API key)
    pub enable_video_search: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_liked_status: true,
            enable_video_search: false,
        }
    }
}

/// Tuning knobs for the discovery pipelines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Number of tags kept after frequency ranking
    pub top_tags_limit: usize,

    /// Number of similar-track candidates requested per seed
    pub similar_limit: u32,

    /// Number of top tracks fetched as taste seeds
    pub top_tracks_limit: u32,

    /// History window for top tracks
    pub top_tracks_time_range: TimeRange,

    /// Budget for each individual external call
    pub call_timeout: Duration,

    /// Fan-out width when resolving candidates against the catalog
    pub max_concurrent_resolutions: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            top_tags_limit: DEFAULT_TOP_TAGS_LIMIT,
            similar_limit: DEFAULT_SIMILAR_LIMIT,
            top_tracks_limit: DEFAULT_TOP_TRACKS_LIMIT,
            top_tracks_time_range: TimeRange::ShortTerm,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            max_concurrent_resolutions: DEFAULT_MAX_CONCURRENT_RESOLUTIONS,
        }
    }
}

impl DiscoveryConfig {
    /// Validates the pipeline limits
    pub fn validate(&self) -> Result<()> {
        if self.top_tags_limit == 0 {
            return Err(Error::Config(
                "Top tags limit must be greater than 0".to_string(),
            ));
        }

        if self.similar_limit == 0 {
            return Err(Error::Config(
                "Similar track limit must be greater than 0".to_string(),
            ));
        }

        if self.top_tracks_limit == 0 || self.top_tracks_limit > MAX_TOP_TRACKS_LIMIT {
            return Err(Error::Config(format!(
                "Top tracks limit must be between 1 and {}",
                MAX_TOP_TRACKS_LIMIT
            )));
        }

        if self.call_timeout.is_zero() {
            return Err(Error::Config(
                "Call timeout must be greater than 0".to_string(),
            ));
        }

        if self.call_timeout > Duration::from_secs(120) {
            return Err(Error::Config(
                "Call timeout exceeds maximum of 120 seconds".to_string(),
            ));
        }

        if self.max_concurrent_resolutions == 0 {
            return Err(Error::Config(
                "Concurrent resolution limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration for external API services.
///
/// # Security Note
///
/// API keys should never be hardcoded in the binary. Load them from the
/// environment ([`ServiceApiConfig::from_env`]) or the host's secure
/// configuration system. `Debug` output never includes the keys.
///
/// # Example
///
/// ```no_run
/// use core_runtime::config::ServiceApiConfig;
///
/// let config = ServiceApiConfig::new()
///     .with_lastfm_api_key("your_lastfm_api_key")
///     .with_rate_limit_delay_ms(250);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ServiceApiConfig {
    /// Last.fm API key for artist.getTopTags and track.getSimilar
    ///
    /// Obtain an API key from: https://www.last.fm/api/account/create
    pub lastfm_api_key: Option<String>,

    /// YouTube Data API v3 key for music video lookup (optional)
    pub youtube_api_key: Option<String>,

    /// Minimum delay in milliseconds between consecutive Last.fm requests
    ///
    /// Default: 200ms (5 requests per second, Last.fm's published ceiling)
    pub rate_limit_delay_ms: u64,

    /// User-Agent presented to the remote services
    pub user_agent: String,
}

impl std::fmt::Debug for ServiceApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceApiConfig")
            .field("lastfm_api_key", &self.lastfm_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("youtube_api_key", &self.youtube_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("rate_limit_delay_ms", &self.rate_limit_delay_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ServiceApiConfig {
    /// Creates a new ServiceApiConfig with no API keys configured
    pub fn new() -> Self {
        Self {
            lastfm_api_key: None,
            youtube_api_key: None,
            rate_limit_delay_ms: 200,
            user_agent: concat!("TasteDiscovery/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Reads `LASTFM_API_KEY`, `YOUTUBE_API_KEY` and `DISCOVERY_RATE_LIMIT_MS`
    ///
    /// Blank variables are treated as unset; an unparsable rate limit keeps
    /// the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut config = Self::new();
        config.lastfm_api_key = non_blank("LASTFM_API_KEY");
        config.youtube_api_key = non_blank("YOUTUBE_API_KEY");
        if let Some(delay) = non_blank("DISCOVERY_RATE_LIMIT_MS").and_then(|v| v.parse().ok()) {
            config.rate_limit_delay_ms = delay;
        }
        config
    }

    /// Sets the Last.fm API key
    pub fn with_lastfm_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.lastfm_api_key = Some(api_key.into());
        self
    }

    /// Sets the YouTube API key
    pub fn with_youtube_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.youtube_api_key = Some(api_key.into());
        self
    }

    /// Sets the rate limit delay in milliseconds
    pub fn with_rate_limit_delay_ms(mut self, delay_ms: u64) -> Self {
        self.rate_limit_delay_ms = delay_ms;
        self
    }

    /// Sets the User-Agent header value
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        match self.lastfm_api_key.as_deref() {
            None => {
                return Err(Error::CapabilityMissing {
                    capability: "Last.fm API key".to_string(),
                    message: "Taste analysis and similar-track lookup both query Last.fm. \
                              Set LASTFM_API_KEY or call with_lastfm_api_key()."
                        .to_string(),
                })
            }
            Some(key) if key.trim().is_empty() => {
                return Err(Error::Config("Last.fm API key cannot be empty".to_string()));
            }
            Some(_) => {}
        }

        if let Some(ref key) = self.youtube_api_key {
            if key.trim().is_empty() {
                return Err(Error::Config("YouTube API key cannot be empty".to_string()));
            }
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::Config("User agent cannot be empty".to_string()));
        }

        if self.rate_limit_delay_ms > 60000 {
            return Err(Error::Config(
                "Rate limit delay exceeds maximum of 60 seconds (60,000ms)".to_string(),
            ));
        }

        Ok(())
    }

    /// Checks if YouTube is configured
    pub fn has_youtube(&self) -> bool {
        self.youtube_api_key.is_some()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks the pipeline limits, the service credentials and that the
    /// feature flags are consistent with the configured services.
    pub fn validate(&self) -> Result<()> {
        self.discovery.validate()?;
        self.service_api_config.validate()?;

        if self.features.enable_video_search && !self.service_api_config.has_youtube() {
            return Err(Error::Config(
                "Video search enabled but no YouTube API key provided. \
                 Disable the feature or set YOUTUBE_API_KEY."
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// HTTP client configured for this core.
    ///
    /// Always `Some` for configs produced by [`CoreConfigBuilder::build`].
    pub fn http_client(&self) -> Result<Arc<dyn HttpClient>> {
        self.http_client.clone().ok_or_else(http_client_missing_error)
    }
}

fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                  Desktop: ensure the 'desktop-shims' feature is enabled. \
                  Other hosts: inject an HttpClient adapter."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    // Transport timeout sits above the per-call budget so the pipeline's own
    // timeout is the one that fires.
    let client = ReqwestHttpClient::with_timeout(timeout + Duration::from_secs(5))
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then
/// call [`build()`](CoreConfigBuilder::build) to create the final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    discovery: DiscoveryConfig,
    service_api_config: Option<ServiceApiConfig>,
    features: FeatureFlags,
}

impl CoreConfigBuilder {
    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) will be used when
    /// the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the external API configuration.
    pub fn service_api_config(mut self, config: ServiceApiConfig) -> Self {
        self.service_api_config = Some(config);
        self
    }

    /// Replaces the whole pipeline configuration.
    pub fn discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    /// Sets how many tags taste analysis returns.
    ///
    /// Default: 30
    pub fn top_tags_limit(mut self, limit: usize) -> Self {
        self.discovery.top_tags_limit = limit;
        self
    }

    /// Sets how many similar candidates are requested per seed.
    ///
    /// Default: 10
    pub fn similar_limit(mut self, limit: u32) -> Self {
        self.discovery.similar_limit = limit;
        self
    }

    /// Sets how many top tracks seed taste analysis.
    ///
    /// Default: 50 (the service maximum)
    pub fn top_tracks_limit(mut self, limit: u32) -> Self {
        self.discovery.top_tracks_limit = limit;
        self
    }

    /// Sets the history window for top tracks.
    pub fn top_tracks_time_range(mut self, range: TimeRange) -> Self {
        self.discovery.top_tracks_time_range = range;
        self
    }

    /// Sets the per-call timeout for external requests.
    ///
    /// Default: 10 seconds
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.discovery.call_timeout = timeout;
        self
    }

    /// Sets how many catalog resolutions may be in flight at once.
    pub fn max_concurrent_resolutions(mut self, limit: usize) -> Self {
        self.discovery.max_concurrent_resolutions = limit;
        self
    }

    /// Enables or disables liked-status enrichment.
    pub fn enable_liked_status(mut self, enable: bool) -> Self {
        self.features.enable_liked_status = enable;
        self
    }

    /// Enables or disables music video lookup.
    pub fn enable_video_search(mut self, enable: bool) -> Self {
        self.features.enable_video_search = enable;
        self
    }

    /// Builds the final [`CoreConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No service configuration was provided
    /// - No HTTP client was provided and no desktop default is available
    /// - Validation fails (see [`CoreConfig::validate`])
    pub fn build(self) -> Result<CoreConfig> {
        let service_api_config = self.service_api_config.ok_or_else(|| {
            Error::Config(
                "Service API configuration is required. \
                 Use ServiceApiConfig::from_env() or provide one explicitly."
                    .to_string(),
            )
        })?;

        let config = CoreConfig {
            http_client: None,
            discovery: self.discovery,
            service_api_config,
            features: self.features,
        };

        config.validate()?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(config.discovery.call_timeout)?,
        };

        Ok(CoreConfig {
            http_client: Some(http_client),
            ..config
        })
    }
}
