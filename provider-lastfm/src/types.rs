//! Last.fm API response types
//!
//! Last.fm's JSON rendering collapses a one-element list into a bare object
//! and omits empty lists entirely, so list fields go through [`OneOrMany`].

use serde::Deserialize;

/// A list that Last.fm may render as a single object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

/// In-body error payload (`{"error": 6, "message": "..."}`)
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: i32,
    #[serde(default)]
    pub message: String,
}

/// `artist.getTopTags` response
///
/// See: https://www.last.fm/api/show/artist.getTopTags
#[derive(Debug, Deserialize)]
pub struct TopTagsResponse {
    #[serde(default)]
    pub toptags: Option<TopTags>,
}

#[derive(Debug, Deserialize)]
pub struct TopTags {
    #[serde(default)]
    pub tag: OneOrMany<TagEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagEntry {
    pub name: String,
    #[serde(default)]
    pub count: Option<serde_json::Value>,
}

/// `track.getSimilar` response
///
/// See: https://www.last.fm/api/show/track.getSimilar
#[derive(Debug, Deserialize)]
pub struct SimilarTracksResponse {
    #[serde(default)]
    pub similartracks: Option<SimilarTracks>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarTracks {
    #[serde(default)]
    pub track: OneOrMany<SimilarTrackEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimilarTrackEntry {
    pub name: String,
    pub artist: ArtistRef,
    #[serde(default, rename = "match")]
    pub match_score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}
