//! Core service façade and bootstrap helpers.
//!
//! This crate wires the remote-service connectors (Last.fm, Spotify and,
//! with the `video` feature, YouTube) into the discovery core. Desktop hosts
//! typically enable the `desktop-shims` feature so a reqwest-backed
//! `HttpClient` is supplied automatically; other hosts inject their own
//! through [`CoreConfig`].
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, ServiceApiConfig};
//! use core_service::CoreService;
//!
//! let config = CoreConfig::builder()
//!     .service_api_config(ServiceApiConfig::from_env())
//!     .build()?;
//! let core = CoreService::from_config(config)?;
//!
//! let tags = core.analyze_my_taste(&token).await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

pub use core_discovery::DiscoveryService;
pub use core_runtime::config::{CoreConfig, ServiceApiConfig};

use std::sync::Arc;

use bridge_traits::music::{
    AccessToken, EnrichedTrack, LikeCheckServiceClient, NowPlaying, NowPlayingClient,
    SearchServiceClient, SeedTrack, SimilarityServiceClient, Tag, TaggingServiceClient,
    TopTracksClient, VideoMatch, VideoSearchClient,
};
use provider_lastfm::LastFmConnector;
use provider_spotify::SpotifyConnector;
use tracing::info;

/// Aggregated handle to every remote service the core talks to.
pub struct CoreDependencies {
    pub tagging: Arc<dyn TaggingServiceClient>,
    pub similarity: Arc<dyn SimilarityServiceClient>,
    pub search: Arc<dyn SearchServiceClient>,
    pub like_check: Arc<dyn LikeCheckServiceClient>,
    pub top_tracks: Arc<dyn TopTracksClient>,
    pub now_playing: Arc<dyn NowPlayingClient>,
    pub video_search: Option<Arc<dyn VideoSearchClient>>,
}

impl CoreDependencies {
    /// Build the production connectors from a validated configuration.
    ///
    /// # Errors
    ///
    /// - Last.fm key missing
    /// - Video search enabled but the `video` feature is not compiled in
    pub fn from_config(config: &CoreConfig) -> Result<Self> {
        let http = config.http_client()?;

        let lastfm = Arc::new(LastFmConnector::from_config(
            Arc::clone(&http),
            &config.service_api_config,
        )?);
        let spotify = Arc::new(SpotifyConnector::new(Arc::clone(&http)));

        Ok(Self {
            tagging: lastfm.clone(),
            similarity: lastfm,
            search: spotify.clone(),
            like_check: spotify.clone(),
            top_tracks: spotify.clone(),
            now_playing: spotify,
            video_search: video_search_client(config, http)?,
        })
    }
}

#[cfg(feature = "video")]
fn video_search_client(
    config: &CoreConfig,
    http: Arc<dyn bridge_traits::http::HttpClient>,
) -> Result<Option<Arc<dyn VideoSearchClient>>> {
    if !config.features.enable_video_search {
        return Ok(None);
    }

    let youtube =
        provider_youtube::YouTubeConnector::from_config(http, &config.service_api_config)?;
    Ok(Some(Arc::new(youtube)))
}

#[cfg(not(feature = "video"))]
fn video_search_client(
    config: &CoreConfig,
    _http: Arc<dyn bridge_traits::http::HttpClient>,
) -> Result<Option<Arc<dyn VideoSearchClient>>> {
    if config.features.enable_video_search {
        return Err(CoreError::CapabilityMissing {
            capability: "VideoSearch".to_string(),
            message: "Video search is enabled but this build lacks the 'video' feature."
                .to_string(),
        });
    }
    Ok(None)
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    discovery: Arc<DiscoveryService>,
    config: Arc<CoreConfig>,
}

impl CoreService {
    /// Create a service from explicit dependencies.
    pub fn new(config: CoreConfig, deps: CoreDependencies) -> Self {
        let mut discovery = DiscoveryService::new(
            deps.tagging,
            deps.similarity,
            deps.search,
            deps.like_check,
            config.discovery.clone(),
        )
        .with_top_tracks(deps.top_tracks)
        .with_now_playing(deps.now_playing);

        if let Some(video) = deps.video_search {
            discovery = discovery.with_video_search(video);
        }
        if !config.features.enable_liked_status {
            discovery = discovery.without_liked_status();
        }

        Self {
            discovery: Arc::new(discovery),
            config: Arc::new(config),
        }
    }

    /// Build the production connectors and wire them up.
    pub fn from_config(config: CoreConfig) -> Result<Self> {
        let deps = CoreDependencies::from_config(&config)?;
        info!(
            liked_status = config.features.enable_liked_status,
            video_search = deps.video_search.is_some(),
            "Core service initialized"
        );
        Ok(Self::new(config, deps))
    }

    pub fn discovery(&self) -> Arc<DiscoveryService> {
        Arc::clone(&self.discovery)
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Top tags for the given seed tracks.
    pub async fn analyze_taste(&self, seeds: &[SeedTrack]) -> Vec<Tag> {
        self.discovery.analyze_taste(seeds).await
    }

    /// Top tags derived from the listener's own top tracks.
    pub async fn analyze_my_taste(&self, token: &AccessToken) -> Result<Vec<Tag>> {
        Ok(self.discovery.analyze_my_taste(token).await?)
    }

    /// Resolved, liked-annotated tracks similar to `seed`.
    pub async fn realtime_recommendations(
        &self,
        seed: &SeedTrack,
        token: &AccessToken,
    ) -> Result<Vec<EnrichedTrack>> {
        Ok(self.discovery.realtime_recommendations(seed, token).await?)
    }

    pub async fn now_playing(&self, token: &AccessToken) -> Result<Option<NowPlaying>> {
        Ok(self.discovery.now_playing(token).await?)
    }

    /// Recommendations seeded from the track currently playing, if any.
    pub async fn recommendations_for_now_playing(
        &self,
        token: &AccessToken,
    ) -> Result<Option<(NowPlaying, Vec<EnrichedTrack>)>> {
        Ok(self.discovery.recommendations_for_now_playing(token).await?)
    }

    pub async fn find_video(&self, query: &str) -> Result<Option<VideoMatch>> {
        Ok(self.discovery.find_video(query).await?)
    }
}
