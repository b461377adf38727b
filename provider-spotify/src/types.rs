//! Spotify Web API response types
//!
//! Only the fields the connector reads are modelled; everything else in the
//! payloads is ignored.

use serde::Deserialize;

/// Track object
///
/// See: https://developer.spotify.com/documentation/web-api/reference/get-track
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    /// Absent for local files
    #[serde(default)]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,

    #[serde(default)]
    pub album: Option<SpotifyAlbum>,

    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl SpotifyTrack {
    /// Name of the first credited artist
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|artist| artist.name.as_str())
    }

    /// URL of the first (largest) album image
    pub fn album_art_url(&self) -> Option<String> {
        self.album
            .as_ref()
            .and_then(|album| album.images.first())
            .map(|image| image.url.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Paging object (`{ "items": [...] }`)
#[derive(Debug, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// `GET /v1/search?type=track`
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<Paging<SpotifyTrack>>,
}

/// `GET /v1/me/player/currently-playing`
#[derive(Debug, Deserialize)]
pub struct CurrentlyPlayingResponse {
    #[serde(default)]
    pub is_playing: bool,

    #[serde(default)]
    pub progress_ms: Option<u64>,

    /// Null while an ad plays or for unsupported content
    #[serde(default)]
    pub item: Option<SpotifyTrack>,

    #[serde(default)]
    pub currently_playing_type: Option<String>,
}

/// Error envelope (`{ "error": { "status": 401, "message": "..." } }`)
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: String,
}
