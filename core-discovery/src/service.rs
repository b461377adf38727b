//! # Discovery Service
//!
//! Entry point for the discovery operations. Owns the tag aggregator and the
//! similarity pipeline, plus the optional collaborators used by the
//! listener-facing helpers (top tracks, now playing, video search).
//!
//! ## Usage
//!
//! ```ignore
//! use core_discovery::DiscoveryService;
//! use std::sync::Arc;
//!
//! let service = DiscoveryService::new(
//!     lastfm.clone(),   // TaggingServiceClient
//!     lastfm,           // SimilarityServiceClient
//!     spotify.clone(),  // SearchServiceClient
//!     spotify.clone(),  // LikeCheckServiceClient
//!     config.discovery.clone(),
//! )
//! .with_top_tracks(spotify.clone())
//! .with_now_playing(spotify);
//!
//! let tags = service.analyze_my_taste(&token).await?;
//! let tracks = service.realtime_recommendations(&seed, &token).await?;
//! ```

use bridge_traits::error::BridgeError;
use bridge_traits::music::{
    AccessToken, EnrichedTrack, LikeCheckServiceClient, NowPlaying, NowPlayingClient,
    SearchServiceClient, SeedTrack, SimilarityServiceClient, Tag, TaggingServiceClient,
    TopTracksClient, VideoMatch, VideoSearchClient,
};
use core_runtime::config::DiscoveryConfig;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::deadline::within;
use crate::error::{DiscoveryError, Result};
use crate::similar::SimilarityResolutionPipeline;
use crate::taste::TagAggregator;

#[derive(Clone)]
pub struct DiscoveryService {
    taste: TagAggregator,
    similar: SimilarityResolutionPipeline,
    top_tracks: Option<Arc<dyn TopTracksClient>>,
    now_playing: Option<Arc<dyn NowPlayingClient>>,
    video_search: Option<Arc<dyn VideoSearchClient>>,
    config: DiscoveryConfig,
}

impl DiscoveryService {
    pub fn new(
        tagging: Arc<dyn TaggingServiceClient>,
        similarity: Arc<dyn SimilarityServiceClient>,
        search: Arc<dyn SearchServiceClient>,
        like_check: Arc<dyn LikeCheckServiceClient>,
        config: DiscoveryConfig,
    ) -> Self {
        Self {
            taste: TagAggregator::new(tagging, config.call_timeout)
                .with_concurrency(config.max_concurrent_resolutions),
            similar: SimilarityResolutionPipeline::new(similarity, search, like_check, &config),
            top_tracks: None,
            now_playing: None,
            video_search: None,
            config,
        }
    }

    pub fn with_top_tracks(mut self, client: Arc<dyn TopTracksClient>) -> Self {
        self.top_tracks = Some(client);
        self
    }

    pub fn with_now_playing(mut self, client: Arc<dyn NowPlayingClient>) -> Self {
        self.now_playing = Some(client);
        self
    }

    pub fn with_video_search(mut self, client: Arc<dyn VideoSearchClient>) -> Self {
        self.video_search = Some(client);
        self
    }

    /// Report every recommendation as not liked without asking the service
    pub fn without_liked_status(mut self) -> Self {
        self.similar = self.similar.without_liked_status();
        self
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Top tags across the given seeds, most frequent first
    pub async fn analyze_taste(&self, seeds: &[SeedTrack]) -> Vec<Tag> {
        self.taste.aggregate(seeds, self.config.top_tags_limit).await
    }

    /// Taste profile built from the listener's own top tracks
    ///
    /// # Errors
    /// Fails only when the top tracks cannot be fetched. An empty listening
    /// history yields an empty profile.
    #[instrument(skip(self, token))]
    pub async fn analyze_my_taste(&self, token: &AccessToken) -> Result<Vec<Tag>> {
        let client = self
            .top_tracks
            .as_ref()
            .ok_or_else(|| DiscoveryError::ProviderNotConfigured("Top tracks source".to_string()))?;

        let seeds = within(
            self.config.call_timeout,
            "top tracks",
            client.top_tracks(
                token,
                self.config.top_tracks_time_range,
                self.config.top_tracks_limit,
            ),
        )
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch top tracks");
            match e {
                BridgeError::Timeout(_) => DiscoveryError::Timeout {
                    operation: "top tracks".to_string(),
                    timeout_ms: self.config.call_timeout.as_millis() as u64,
                },
                other => DiscoveryError::AnalysisFailed(other),
            }
        })?;

        info!(seed_count = seeds.len(), "Fetched top tracks");
        Ok(self.analyze_taste(&seeds).await)
    }

    /// Resolved, liked-annotated recommendations similar to `seed`
    pub async fn realtime_recommendations(
        &self,
        seed: &SeedTrack,
        token: &AccessToken,
    ) -> Result<Vec<EnrichedTrack>> {
        self.similar.run(seed, token).await
    }

    /// The track currently playing, `None` when playback is idle
    #[instrument(skip(self, token))]
    pub async fn now_playing(&self, token: &AccessToken) -> Result<Option<NowPlaying>> {
        let client = self
            .now_playing
            .as_ref()
            .ok_or_else(|| DiscoveryError::ProviderNotConfigured("Now playing source".to_string()))?;

        let playing = within(
            self.config.call_timeout,
            "currently playing",
            client.currently_playing(token),
        )
        .await
        .map_err(DiscoveryError::LookupFailed)?;

        debug!(playing = playing.is_some(), "Fetched playback state");
        Ok(playing)
    }

    /// Recommendations seeded from whatever is playing right now
    ///
    /// `Ok(None)` when nothing is playing or the track has no credited artist.
    pub async fn recommendations_for_now_playing(
        &self,
        token: &AccessToken,
    ) -> Result<Option<(NowPlaying, Vec<EnrichedTrack>)>> {
        let Some(playing) = self.now_playing(token).await? else {
            return Ok(None);
        };
        let Some(seed) = playing.seed() else {
            debug!("Playing track has no credited artist");
            return Ok(None);
        };

        let tracks = self.realtime_recommendations(&seed, token).await?;
        Ok(Some((playing, tracks)))
    }

    /// Best music-video match for a free-text query
    #[instrument(skip(self))]
    pub async fn find_video(&self, query: &str) -> Result<Option<VideoMatch>> {
        if query.trim().is_empty() {
            return Err(DiscoveryError::InvalidInput(
                "video query must not be blank".to_string(),
            ));
        }

        let client = self
            .video_search
            .as_ref()
            .ok_or_else(|| DiscoveryError::ProviderNotConfigured("Video search".to_string()))?;

        within(
            self.config.call_timeout,
            "video search",
            client.find_music_video(query.trim()),
        )
        .await
        .map_err(DiscoveryError::LookupFailed)
    }
}
