//! Last.fm API connector
//!
//! ## API Endpoints
//!
//! - **Artist tags**: `https://ws.audioscrobbler.com/2.0/?method=artist.gettoptags&artist={artist}&api_key={key}&format=json`
//! - **Similar tracks**: `https://ws.audioscrobbler.com/2.0/?method=track.getsimilar&artist={artist}&track={title}&limit={n}&api_key={key}&format=json`
//!
//! ## Rate Limiting
//!
//! Requests are spaced by a configurable minimum delay (see
//! `ServiceApiConfig::rate_limit_delay_ms`). Last.fm reports most errors
//! inside a `200 OK` body; error 6 ("not found") is treated as an empty
//! result rather than a failure.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::music::{SimilarCandidate, SimilarityServiceClient, Tag, TaggingServiceClient};
use core_runtime::config::ServiceApiConfig;
use core_runtime::logging::redact_url;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::{LastFmError, Result};
use crate::types::{ErrorResponse, SimilarTracksResponse, TopTagsResponse};

/// Last.fm API base URL
pub const LASTFM_API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

/// Timeout for API requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// "Invalid parameters", which Last.fm also uses for unknown artists and tracks
const ERROR_NOT_FOUND: i32 = 6;
const ERROR_INVALID_API_KEY: i32 = 10;
const ERROR_SUSPENDED_API_KEY: i32 = 26;
const ERROR_RATE_LIMIT: i32 = 29;

/// Enforces a minimum delay between consecutive requests
struct RateLimiter {
    last_request: Option<Instant>,
    min_delay: Duration,
}

impl RateLimiter {
    fn new(delay_ms: u64) -> Self {
        Self {
            last_request: None,
            min_delay: Duration::from_millis(delay_ms),
        }
    }

    async fn wait_if_needed(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                let wait_time = self.min_delay - elapsed;
                debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

/// Last.fm API connector
///
/// Implements [`TaggingServiceClient`] and [`SimilarityServiceClient`].
///
/// # Example
///
/// ```ignore
/// use provider_lastfm::LastFmConnector;
///
/// let lastfm = LastFmConnector::new(http_client, api_key, 200);
/// let tags = lastfm.top_tags_for_artist("Radiohead").await?;
/// ```
pub struct LastFmConnector {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    user_agent: String,
    base_url: String,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl LastFmConnector {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        api_key: impl Into<String>,
        rate_limit_delay_ms: u64,
    ) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            user_agent: concat!("taste-discovery/", env!("CARGO_PKG_VERSION")).to_string(),
            base_url: LASTFM_API_BASE.to_string(),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(rate_limit_delay_ms))),
        }
    }

    /// Build a connector from the service configuration
    ///
    /// # Errors
    ///
    /// Returns [`LastFmError::MissingApiKey`] if no Last.fm key is configured.
    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &ServiceApiConfig) -> Result<Self> {
        let api_key = config
            .lastfm_api_key
            .clone()
            .ok_or(LastFmError::MissingApiKey)?;

        Ok(Self::new(http_client, api_key, config.rate_limit_delay_ms)
            .with_user_agent(config.user_agent.clone()))
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Point the connector at a different endpoint (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, method: &str) -> HttpRequest {
        HttpRequest::get(self.base_url.clone())
            .query("method", method)
            .header("User-Agent", self.user_agent.clone())
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT)
    }

    fn finish(&self, request: HttpRequest) -> HttpRequest {
        request
            .query("api_key", &self.api_key)
            .query("format", "json")
    }

    /// Execute a request and decode the body
    ///
    /// Returns `Ok(None)` when Last.fm reports the entity as unknown.
    async fn call<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<Option<T>> {
        let request = self.finish(request);
        debug!(url = %redact_url(&request.url), "Querying Last.fm");

        self.rate_limiter.lock().await.wait_if_needed().await;

        let response = self.http_client.execute(request).await?;
        Self::check_status(&response)?;

        if let Ok(error) = serde_json::from_slice::<ErrorResponse>(&response.body) {
            return match error.error {
                ERROR_NOT_FOUND => {
                    debug!(message = %error.message, "Last.fm reports entity not found");
                    Ok(None)
                }
                ERROR_INVALID_API_KEY | ERROR_SUSPENDED_API_KEY => {
                    Err(LastFmError::InvalidApiKey(error.message))
                }
                ERROR_RATE_LIMIT => Err(LastFmError::RateLimited {
                    retry_after_seconds: 60,
                }),
                code => Err(LastFmError::ApiError {
                    code,
                    message: error.message,
                }),
            };
        }

        serde_json::from_slice(&response.body)
            .map(Some)
            .map_err(|e| LastFmError::ParseError(e.to_string()))
    }

    fn check_status(response: &HttpResponse) -> Result<()> {
        if response.is_success() {
            return Ok(());
        }

        // Last.fm uses 4xx with an error body for bad keys and unknown entities
        if response.is_client_error() && response.status != 429 {
            if let Ok(error) = serde_json::from_slice::<ErrorResponse>(&response.body) {
                if error.error == ERROR_NOT_FOUND {
                    return Ok(());
                }
            }
        }

        if response.status == 429 {
            let retry_after = response
                .header("Retry-After")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(60);
            warn!(retry_after, "Last.fm rate limit hit");
            return Err(LastFmError::RateLimited {
                retry_after_seconds: retry_after,
            });
        }

        Err(LastFmError::HttpError {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).to_string(),
        })
    }

    /// Top tags for an artist, in Last.fm's order, blank names removed
    #[instrument(skip(self))]
    pub async fn artist_top_tags(&self, artist: &str) -> Result<Vec<Tag>> {
        let request = self
            .request("artist.gettoptags")
            .query("artist", artist)
            .query("autocorrect", "1");

        let Some(response) = self.call::<TopTagsResponse>(request).await? else {
            return Ok(Vec::new());
        };

        let tags: Vec<Tag> = response
            .toptags
            .map(|toptags| toptags.tag.into_vec())
            .unwrap_or_default()
            .into_iter()
            .map(|entry| entry.name)
            .filter(|name| !name.trim().is_empty())
            .collect();

        debug!(count = tags.len(), "Fetched artist tags from Last.fm");
        Ok(tags)
    }

    /// Tracks similar to (`artist`, `title`), most similar first
    #[instrument(skip(self))]
    pub async fn similar(&self, artist: &str, title: &str, limit: u32) -> Result<Vec<SimilarCandidate>> {
        let request = self
            .request("track.getsimilar")
            .query("artist", artist)
            .query("track", title)
            .query("limit", limit.to_string())
            .query("autocorrect", "1");

        let Some(response) = self.call::<SimilarTracksResponse>(request).await? else {
            return Ok(Vec::new());
        };

        let mut tracks: Vec<SimilarCandidate> = response
            .similartracks
            .map(|similar| similar.track.into_vec())
            .unwrap_or_default()
            .into_iter()
            .filter(|entry| !entry.name.trim().is_empty() && !entry.artist.name.trim().is_empty())
            .map(|entry| SimilarCandidate::new(entry.name, entry.artist.name))
            .collect();
        tracks.truncate(limit as usize);

        info!(count = tracks.len(), "Fetched similar tracks from Last.fm");
        Ok(tracks)
    }
}

#[async_trait]
impl TaggingServiceClient for LastFmConnector {
    async fn top_tags_for_artist(&self, artist_name: &str) -> BridgeResult<Vec<Tag>> {
        Ok(self.artist_top_tags(artist_name).await?)
    }
}

#[async_trait]
impl SimilarityServiceClient for LastFmConnector {
    async fn similar_tracks(
        &self,
        artist_name: &str,
        title: &str,
        limit: u32,
    ) -> BridgeResult<Vec<SimilarCandidate>> {
        Ok(self.similar(artist_name, title, limit).await?)
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

    fn json_response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn connector(mock: MockHttpClient) -> LastFmConnector {
        LastFmConnector::new(Arc::new(mock), "test_key", 0)
    }

    #[tokio::test]
    async fn test_top_tags_request_and_parse() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|req| {
                req.url.starts_with(LASTFM_API_BASE)
                    && req.url.contains("method=artist.gettoptags")
                    && req.url.contains("artist=Sigur%20R%C3%B3s")
                    && req.url.contains("api_key=test_key")
                    && req.url.contains("format=json")
            })
            .times(1)
            .returning(|_| {
                Ok(json_response(
                    200,
                    r#"{"toptags":{"tag":[{"name":"post-rock","count":100},{"name":" ","count":3},{"name":"Icelandic","count":80}]}}"#,
                ))
            });

        let tags = connector(mock).artist_top_tags("Sigur Rós").await.unwrap();
        assert_eq!(tags, vec!["post-rock".to_string(), "Icelandic".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_artist_yields_no_tags() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute().returning(|_| {
            Ok(json_response(
                200,
                r#"{"error":6,"message":"The artist you supplied could not be found"}"#,
            ))
        });

        let tags = connector(mock).artist_top_tags("Nobody").await.unwrap();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_with_client_status_yields_no_tags() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute().returning(|_| {
            Ok(json_response(
                400,
                r#"{"error":6,"message":"Track not found"}"#,
            ))
        });

        let similar = connector(mock).similar("Nobody", "Nothing", 10).await.unwrap();
        assert!(similar.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_key_is_an_error() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute().returning(|_| {
            Ok(json_response(
                403,
                r#"{"error":10,"message":"Invalid API key"}"#,
            ))
        });

        let err = connector(mock).artist_top_tags("Anyone").await.unwrap_err();
        assert!(matches!(err, LastFmError::HttpError { status: 403, .. }));

        let mut mock = MockHttpClient::new();
        mock.expect_execute().returning(|_| {
            Ok(json_response(
                200,
                r#"{"error":10,"message":"Invalid API key"}"#,
            ))
        });
        let err = connector(mock).artist_top_tags("Anyone").await.unwrap_err();
        assert!(matches!(err, LastFmError::InvalidApiKey(_)));
    }

    #[tokio::test]
    async fn test_similar_tracks_request_and_parse() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .withf(|req| {
                req.url.contains("method=track.getsimilar")
                    && req.url.contains("artist=Artist%20X")
                    && req.url.contains("track=Song%20A")
                    && req.url.contains("limit=10")
            })
            .times(1)
            .returning(|_| {
                Ok(json_response(
                    200,
                    r#"{"similartracks":{"track":[
                        {"name":"Song B","match":1.0,"artist":{"name":"Artist Y"}},
                        {"name":"Song C","match":0.8,"artist":{"name":"Artist Z"}}
                    ]}}"#,
                ))
            });

        let tracks = connector(mock).similar("Artist X", "Song A", 10).await.unwrap();
        assert_eq!(
            tracks,
            vec![
                SimilarCandidate::new("Song B", "Artist Y"),
                SimilarCandidate::new("Song C", "Artist Z"),
            ]
        );
    }

    #[tokio::test]
    async fn test_similar_tracks_capped_at_limit() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute().returning(|_| {
            let entries: Vec<String> = (0..5)
                .map(|i| format!(r#"{{"name":"S{}","artist":{{"name":"A{}"}}}}"#, i, i))
                .collect();
            Ok(json_response(
                200,
                &format!(r#"{{"similartracks":{{"track":[{}]}}}}"#, entries.join(",")),
            ))
        });

        let tracks = connector(mock).similar("A", "S", 3).await.unwrap();
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[2].title, "S2");
    }

    #[tokio::test]
    async fn test_server_error_maps_to_bridge_status() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Ok(json_response(503, "Service Unavailable")));

        let err = connector(mock)
            .similar_tracks("Artist X", "Song A", 10)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute().returning(|_| {
            let mut response = json_response(429, "");
            response
                .headers
                .insert("Retry-After".to_string(), "12".to_string());
            Ok(response)
        });

        let err = connector(mock).artist_top_tags("Anyone").await.unwrap_err();
        assert!(matches!(
            err,
            LastFmError::RateLimited {
                retry_after_seconds: 12
            }
        ));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let mut mock = MockHttpClient::new();
        mock.expect_execute()
            .returning(|_| Err(BridgeError::Timeout("Request timed out".to_string())));

        let err = connector(mock)
            .top_tags_for_artist("Anyone")
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Timeout(_)));
    }

    #[test]
    fn test_from_config_requires_key() {
        let http: Arc<dyn HttpClient> = Arc::new(MockHttpClient::new());

        let missing = LastFmConnector::from_config(http.clone(), &ServiceApiConfig::new());
        assert!(matches!(missing, Err(LastFmError::MissingApiKey)));

        let config = ServiceApiConfig::new().with_lastfm_api_key("abc");
        assert!(LastFmConnector::from_config(http, &config).is_ok());
    }
}
