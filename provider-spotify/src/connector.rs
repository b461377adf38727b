//! Spotify Web API connector
//!
//! Implements [`SearchServiceClient`], [`LikeCheckServiceClient`],
//! [`TopTracksClient`] and [`NowPlayingClient`].

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::music::{
    AccessToken, CatalogCandidate, LikeCheckServiceClient, NowPlaying, NowPlayingClient,
    SearchServiceClient, SeedTrack, TimeRange, TopTracksClient,
};
use core_runtime::config::MAX_TOP_TRACKS_LIMIT;
use core_runtime::logging::redact_if_sensitive;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SpotifyError};
use crate::types::{CurrentlyPlayingResponse, ErrorEnvelope, Paging, SearchResponse, SpotifyTrack};

/// Spotify Web API base URL
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Largest id list accepted by `/me/tracks/contains`
pub const MAX_CONTAINS_IDS: usize = 50;

/// Largest page size accepted by `/search`
const MAX_SEARCH_LIMIT: u32 = 50;

/// Timeout for API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Spotify Web API connector
///
/// Stateless apart from the shared HTTP client; the access token travels
/// with every call.
///
/// # Example
///
/// ```ignore
/// use provider_spotify::SpotifyConnector;
///
/// let spotify = SpotifyConnector::new(http_client);
/// let hits = spotify.search("track:Song B artist:Artist Y", 1, &token).await?;
/// ```
pub struct SpotifyConnector {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
}

impl SpotifyConnector {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: SPOTIFY_API_BASE.to_string(),
        }
    }

    /// Point the connector at a different endpoint (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, path: &str, token: &AccessToken) -> HttpRequest {
        HttpRequest::get(format!("{}{}", self.base_url, path))
            .bearer_token(token)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
    }

    /// Request headers with credential values masked, sorted by name
    fn loggable_headers(request: &HttpRequest) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = request
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), redact_if_sensitive(name, value)))
            .collect();
        headers.sort();
        headers
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(
            url = %request.url,
            headers = ?Self::loggable_headers(&request),
            "Calling Spotify API"
        );
        let response = self.http_client.execute(request).await?;

        if response.is_success() {
            return Ok(response);
        }

        let message = serde_json::from_slice::<ErrorEnvelope>(&response.body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&response.body).to_string());

        warn!(status = response.status, %message, "Spotify API request failed");

        Err(match response.status {
            401 => SpotifyError::AuthenticationFailed(message),
            403 => SpotifyError::Forbidden(message),
            429 => SpotifyError::RateLimitExceeded {
                retry_after_seconds: response
                    .header("Retry-After")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(1),
            },
            status => SpotifyError::ApiError {
                status_code: status,
                message,
            },
        })
    }

    fn parse<T: DeserializeOwned>(response: &HttpResponse, what: &str) -> Result<T> {
        serde_json::from_slice(&response.body)
            .map_err(|e| SpotifyError::ParseError(format!("Failed to parse {}: {}", what, e)))
    }

    fn to_candidate(track: SpotifyTrack) -> Option<CatalogCandidate> {
        let album_art_url = track.album_art_url();
        let artist_name = track.primary_artist().unwrap_or_default().to_string();
        let catalog_id = track.id?;
        let playable_uri = track
            .uri
            .unwrap_or_else(|| format!("spotify:track:{}", catalog_id));

        Some(CatalogCandidate {
            catalog_id,
            name: track.name,
            artist_name,
            album_art_url,
            playable_uri,
        })
    }

    /// Search the catalog for tracks
    #[instrument(skip(self, token))]
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
        token: &AccessToken,
    ) -> Result<Vec<CatalogCandidate>> {
        let request = self
            .request("/search", token)
            .query("q", query)
            .query("type", "track")
            .query("limit", limit.clamp(1, MAX_SEARCH_LIMIT).to_string());

        let response = self.send(request).await?;
        let parsed: SearchResponse = Self::parse(&response, "search response")?;

        let candidates: Vec<CatalogCandidate> = parsed
            .tracks
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .filter_map(Self::to_candidate)
            .collect();

        debug!(count = candidates.len(), "Spotify search complete");
        Ok(candidates)
    }

    /// Whether each id is in the listener's saved tracks
    ///
    /// # Errors
    ///
    /// More than [`MAX_CONTAINS_IDS`] ids is rejected without a request.
    #[instrument(skip(self, ids, token), fields(id_count = ids.len()))]
    pub async fn saved_tracks_contain(
        &self,
        ids: &[String],
        token: &AccessToken,
    ) -> Result<Vec<bool>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > MAX_CONTAINS_IDS {
            return Err(SpotifyError::InvalidRequest(format!(
                "at most {} ids per contains check, got {}",
                MAX_CONTAINS_IDS,
                ids.len()
            )));
        }

        let request = self
            .request("/me/tracks/contains", token)
            .query("ids", ids.join(","));

        let response = self.send(request).await?;
        Self::parse(&response, "contains response")
    }

    /// The listener's most played tracks as taste seeds
    ///
    /// Tracks without a credited artist are skipped.
    #[instrument(skip(self, token))]
    pub async fn user_top_tracks(
        &self,
        token: &AccessToken,
        range: TimeRange,
        limit: u32,
    ) -> Result<Vec<SeedTrack>> {
        let request = self
            .request("/me/top/tracks", token)
            .query("time_range", range.as_str())
            .query("limit", limit.clamp(1, MAX_TOP_TRACKS_LIMIT).to_string());

        let response = self.send(request).await?;
        let page: Paging<SpotifyTrack> = Self::parse(&response, "top tracks")?;

        let seeds: Vec<SeedTrack> = page
            .items
            .iter()
            .filter_map(|track| {
                track
                    .primary_artist()
                    .map(|artist| SeedTrack::new(track.name.clone(), artist))
            })
            .collect();

        info!(count = seeds.len(), "Fetched top tracks from Spotify");
        Ok(seeds)
    }

    /// The track on the listener's active device
    ///
    /// `Ok(None)` when nothing is playing (HTTP 204) or the item is not a
    /// track (ads, podcast episodes).
    #[instrument(skip(self, token))]
    pub async fn currently_playing_track(&self, token: &AccessToken) -> Result<Option<NowPlaying>> {
        let response = self
            .send(self.request("/me/player/currently-playing", token))
            .await?;

        if response.is_empty() {
            debug!("Nothing is playing");
            return Ok(None);
        }

        let parsed: CurrentlyPlayingResponse = Self::parse(&response, "currently playing")?;
        if parsed
            .currently_playing_type
            .as_deref()
            .is_some_and(|kind| kind != "track")
        {
            debug!(kind = ?parsed.currently_playing_type, "Playing item is not a track");
            return Ok(None);
        }

        let Some(track) = parsed.item else {
            return Ok(None);
        };

        Ok(Some(NowPlaying {
            album_art_url: track.album_art_url(),
            artist_names: track.artists.iter().map(|a| a.name.clone()).collect(),
            title: track.name,
            progress_ms: parsed.progress_ms,
            duration_ms: track.duration_ms.unwrap_or_default(),
        }))
    }
}

#[async_trait]
impl SearchServiceClient for SpotifyConnector {
    async fn search_tracks(
        &self,
        query: &str,
        limit: u32,
        token: &AccessToken,
    ) -> BridgeResult<Vec<CatalogCandidate>> {
        Ok(self.search(query, limit, token).await?)
    }
}

#[async_trait]
impl LikeCheckServiceClient for SpotifyConnector {
    async fn contains(&self, catalog_ids: &[String], token: &AccessToken) -> BridgeResult<Vec<bool>> {
        Ok(self.saved_tracks_contain(catalog_ids, token).await?)
    }
}

#[async_trait]
impl TopTracksClient for SpotifyConnector {
    async fn top_tracks(
        &self,
        token: &AccessToken,
        range: TimeRange,
        limit: u32,
    ) -> BridgeResult<Vec<SeedTrack>> {
        Ok(self.user_top_tracks(token, range, limit).await?)
    }
}

#[async_trait]
impl NowPlayingClient for SpotifyConnector {
    async fn currently_playing(&self, token: &AccessToken) -> BridgeResult<Option<NowPlaying>> {
        Ok(self.currently_playing_track(token).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use bridge_traits::http::RetryPolicy;
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
            async fn execute_with_retry(&self, request: HttpRequest, policy: RetryPolicy) -> BridgeResult<HttpResponse>;
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn token() -> AccessToken {
        AccessToken::new("test_token")
    }

    fn connector(mock: MockHttpClient) -> SpotifyConnector {
        SpotifyConnector::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_search_builds_request_and_maps_first_hit() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|req| {
                req.url.starts_with("https://api.spotify.com/v1/search?")
                    && req.url.contains("q=track%3ASong%20B%20artist%3AArtist%20Y")
                    && req.url.contains("type=track")
                    && req.url.contains("limit=1")
                    && req.headers.get("Authorization") == Some(&"Bearer test_token".to_string())
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"tracks":{"items":[{
                        "id":"id1","name":"Song B","uri":"spotify:track:id1",
                        "artists":[{"name":"Artist Y"}],
                        "album":{"images":[{"url":"https://i.scdn.co/image/abc"}]}
                    }]}}"#,
                ))
            });

        let hits = connector(mock)
            .search("track:Song B artist:Artist Y", 1, &token())
            .await
            .unwrap();

        assert_eq!(
            hits,
            vec![CatalogCandidate {
                catalog_id: "id1".to_string(),
                name: "Song B".to_string(),
                artist_name: "Artist Y".to_string(),
                album_art_url: Some("https://i.scdn.co/image/abc".to_string()),
                playable_uri: "spotify:track:id1".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_search_tolerates_missing_art_and_uri() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute().returning(|_| {
            Ok(response(
                200,
                r#"{"tracks":{"items":[
                    {"id":null,"name":"Local file","artists":[{"name":"Me"}]},
                    {"id":"id2","name":"Song C","artists":[{"name":"Artist Z"}],"album":{"images":[]}}
                ]}}"#,
            ))
        });

        let hits = connector(mock).search("q", 5, &token()).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].album_art_url, None);
        assert_eq!(hits[0].playable_uri, "spotify:track:id2");
    }

    #[tokio::test]
    async fn test_search_without_tracks_is_empty() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Ok(response(200, r#"{"tracks":{"items":[]}}"#)));

        assert!(connector(mock).search("q", 1, &token()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_contains_joins_ids() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|req| {
                req.url == "https://api.spotify.com/v1/me/tracks/contains?ids=id1%2Cid2"
            })
            .times(1)
            .returning(|_| Ok(response(200, "[true,false]")));

        let flags = connector(mock)
            .saved_tracks_contain(&["id1".to_string(), "id2".to_string()], &token())
            .await
            .unwrap();
        assert_eq!(flags, vec![true, false]);
    }

    #[tokio::test]
    async fn test_contains_rejects_oversized_batch() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute().never();

        let ids: Vec<String> = (0..51).map(|i| format!("id{}", i)).collect();
        let err = connector(mock)
            .saved_tracks_contain(&ids, &token())
            .await
            .unwrap_err();
        assert!(matches!(err, SpotifyError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_expired_token_maps_to_401() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute().returning(|_| {
            Ok(response(
                401,
                r#"{"error":{"status":401,"message":"The access token expired"}}"#,
            ))
        });

        let err = connector(mock)
            .contains(&["id1".to_string()], &token())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("The access token expired"));
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute().returning(|_| {
            let mut resp = response(429, "");
            resp.headers
                .insert("retry-after".to_string(), "7".to_string());
            Ok(resp)
        });

        let err = connector(mock).search("q", 1, &token()).await.unwrap_err();
        assert!(matches!(
            err,
            SpotifyError::RateLimitExceeded {
                retry_after_seconds: 7
            }
        ));
    }

    #[tokio::test]
    async fn test_top_tracks_uses_first_artist() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|req| {
                req.url.contains("/me/top/tracks")
                    && req.url.contains("time_range=short_term")
                    && req.url.contains("limit=50")
            })
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"items":[
                        {"id":"a","name":"Song A","artists":[{"name":"Artist X"},{"name":"Feat"}]},
                        {"id":"b","name":"No Credit","artists":[]},
                        {"id":"c","name":"Song D","artists":[{"name":"Artist W"}]}
                    ]}"#,
                ))
            });

        let seeds = connector(mock)
            .user_top_tracks(&token(), TimeRange::ShortTerm, 50)
            .await
            .unwrap();
        assert_eq!(
            seeds,
            vec![
                SeedTrack::new("Song A", "Artist X"),
                SeedTrack::new("Song D", "Artist W"),
            ]
        );
    }

    #[tokio::test]
    async fn test_currently_playing_idle_is_none() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute().returning(|_| Ok(response(204, "")));

        assert_eq!(
            connector(mock).currently_playing_track(&token()).await.unwrap(),
            None
        );
    }

    #[test]
    fn test_loggable_headers_mask_bearer_token() {
        let request = connector(MockHttpClient::new()).request("/search", &token());

        let headers = SpotifyConnector::loggable_headers(&request);

        assert_eq!(
            headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), "[REDACTED]".to_string()),
            ]
        );
        assert!(!format!("{:?}", headers).contains("test_token"));
    }

    #[tokio::test]
    async fn test_currently_playing_track() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|req| req.url.ends_with("/me/player/currently-playing"))
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"is_playing":true,"progress_ms":42000,"currently_playing_type":"track",
                        "item":{"id":"a","name":"Song A","duration_ms":210000,
                            "artists":[{"name":"Artist X"},{"name":"Guest"}],
                            "album":{"images":[{"url":"https://i.scdn.co/a"}]}}}"#,
                ))
            });

        let playing = connector(mock)
            .currently_playing_track(&token())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(playing.title, "Song A");
        assert_eq!(playing.artist_display(), "Artist X, Guest");
        assert_eq!(playing.progress_ms, Some(42000));
        assert_eq!(playing.duration_ms, 210000);
        assert_eq!(playing.album_art_url.as_deref(), Some("https://i.scdn.co/a"));
    }

    #[tokio::test]
    async fn test_currently_playing_ad_is_none() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute().returning(|_| {
            Ok(response(
                200,
                r#"{"is_playing":true,"currently_playing_type":"ad","item":null}"#,
            ))
        });

        assert_eq!(
            connector(mock).currently_playing(&token()).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_transport_failure_passes_through() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Err(BridgeError::OperationFailed("Connection failed".to_string())));

        let err = connector(mock)
            .search_tracks("q", 1, &token())
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::OperationFailed(_)));
    }
}
