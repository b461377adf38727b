//! Remote Music Service Contracts
//!
//! Traits for the third-party services the discovery core talks to, and the
//! value types that cross those boundaries. Connector crates
//! (`provider-lastfm`, `provider-spotify`, `provider-youtube`) implement these
//! traits; `core-discovery` consumes them through `Arc<dyn ...>` handles so
//! tests can substitute doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// A tag as supplied by the tagging service. Case is not guaranteed.
pub type Tag = String;

/// OAuth access token for the streaming service.
///
/// Read-only input to the pipelines. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Accepts either a raw token or an `Authorization: Bearer <token>` value
    pub fn from_header(value: &str) -> Self {
        let value = value.trim();
        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
            .unwrap_or(value);
        Self(token.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A (title, artist) pair used as the basis of a query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedTrack {
    pub title: String,
    pub artist_name: String,
}

impl SeedTrack {
    pub fn new(title: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist_name: artist_name.into(),
        }
    }
}

/// A similarity-service suggestion not yet confirmed to exist in the catalog
pub type SimilarCandidate = SeedTrack;

/// A concrete, playable entry in the streaming catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCandidate {
    pub catalog_id: String,
    pub name: String,
    pub artist_name: String,
    pub album_art_url: Option<String>,
    pub playable_uri: String,
}

/// A resolved catalog entry annotated with the listener's liked status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTrack {
    #[serde(flatten)]
    pub track: CatalogCandidate,
    pub is_liked: bool,
}

impl EnrichedTrack {
    pub fn new(track: CatalogCandidate, is_liked: bool) -> Self {
        Self { track, is_liked }
    }

    pub fn catalog_id(&self) -> &str {
        &self.track.catalog_id
    }
}

/// Listening-history window for top tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    /// Roughly the last four weeks
    #[default]
    ShortTerm,
    /// Roughly the last six months
    MediumTerm,
    /// Several years of history
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short_term",
            Self::MediumTerm => "medium_term",
            Self::LongTerm => "long_term",
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short_term" | "short" => Ok(Self::ShortTerm),
            "medium_term" | "medium" => Ok(Self::MediumTerm),
            "long_term" | "long" => Ok(Self::LongTerm),
            other => Err(format!("unknown time range '{}'", other)),
        }
    }
}

/// The track currently playing on the listener's device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlaying {
    pub title: String,
    /// Every credited artist, in service order
    pub artist_names: Vec<String>,
    pub album_art_url: Option<String>,
    pub progress_ms: Option<u64>,
    pub duration_ms: u64,
}

impl NowPlaying {
    /// Display form of the credits ("A, B")
    pub fn artist_display(&self) -> String {
        self.artist_names.join(", ")
    }

    /// Seed built from the primary artist, if one is credited
    pub fn seed(&self) -> Option<SeedTrack> {
        self.artist_names
            .first()
            .map(|artist| SeedTrack::new(self.title.clone(), artist.clone()))
    }
}

/// Best video match for a free-text query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMatch {
    pub video_id: String,
    pub title: Option<String>,
}

/// Tagging service (artist → descriptive tags)
#[async_trait]
pub trait TaggingServiceClient: Send + Sync {
    /// Top tags for an artist, service order. Unknown artists yield an empty list.
    async fn top_tags_for_artist(&self, artist_name: &str) -> Result<Vec<Tag>>;
}

/// Streaming catalog search
#[async_trait]
pub trait SearchServiceClient: Send + Sync {
    /// Search tracks with a service-specific query string
    async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
        token: &AccessToken,
    ) -> Result<Vec<CatalogCandidate>>;
}

/// Similarity service (track → similar tracks)
#[async_trait]
pub trait SimilarityServiceClient: Send + Sync {
    async fn similar_tracks(
        &self,
        artist_name: &str,
        title: &str,
        limit: u32,
    ) -> Result<Vec<SimilarCandidate>>;
}

/// Streaming library "contains" check
#[async_trait]
pub trait LikeCheckServiceClient: Send + Sync {
    /// One flag per id, positionally aligned with `catalog_ids`
    async fn contains(&self, catalog_ids: &[String], token: &AccessToken) -> Result<Vec<bool>>;
}

/// Source of a listener's top tracks (seeds for taste analysis)
#[async_trait]
pub trait TopTracksClient: Send + Sync {
    async fn top_tracks(
        &self,
        token: &AccessToken,
        range: TimeRange,
        limit: u32,
    ) -> Result<Vec<SeedTrack>>;
}

/// Source of the currently playing track
#[async_trait]
pub trait NowPlayingClient: Send + Sync {
    /// `Ok(None)` when nothing is playing
    async fn currently_playing(&self, token: &AccessToken) -> Result<Option<NowPlaying>>;
}

/// Video search (query → playable video)
#[async_trait]
pub trait VideoSearchClient: Send + Sync {
    async fn find_music_video(&self, query: &str) -> Result<Option<VideoMatch>>;
}
