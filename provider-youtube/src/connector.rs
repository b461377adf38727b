//! YouTube Data API connector

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::music::{VideoMatch, VideoSearchClient};
use core_runtime::config::ServiceApiConfig;
use core_runtime::logging::redact_url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{Result, YouTubeError};
use crate::types::{ErrorEnvelope, SearchListResponse};

/// YouTube Data API v3 base URL
pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube's "Music" video category
const MUSIC_CATEGORY_ID: &str = "10";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct YouTubeConnector {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
}

impl YouTubeConnector {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: YOUTUBE_API_BASE.to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns [`YouTubeError::MissingApiKey`] if no YouTube key is configured.
    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &ServiceApiConfig) -> Result<Self> {
        let api_key = config
            .youtube_api_key
            .clone()
            .ok_or(YouTubeError::MissingApiKey)?;
        Ok(Self::new(http_client, api_key))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Top music-video hit for `query`, `None` when nothing matches
    #[instrument(skip(self))]
    pub async fn search_music_video(&self, query: &str) -> Result<Option<VideoMatch>> {
        let request = HttpRequest::get(format!("{}/search", self.base_url))
            .query("part", "id,snippet")
            .query("q", query)
            .query("maxResults", "1")
            .query("type", "video")
            .query("videoCategoryId", MUSIC_CATEGORY_ID)
            .query("key", &self.api_key)
            .header("Accept", "application/json")
            .timeout(REQUEST_TIMEOUT);

        debug!(url = %redact_url(&request.url), "Searching YouTube");
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&response.body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&response.body).to_string());
            warn!(status = response.status, %message, "YouTube search failed");

            return Err(if response.status == 403 {
                YouTubeError::QuotaExceeded(message)
            } else {
                YouTubeError::ApiError {
                    status_code: response.status,
                    message,
                }
            });
        }

        let parsed: SearchListResponse = serde_json::from_slice(&response.body)
            .map_err(|e| YouTubeError::ParseError(e.to_string()))?;

        let found = parsed.items.into_iter().find_map(|item| {
            let title = item.snippet.and_then(|snippet| snippet.title);
            item.id
                .video_id
                .filter(|id| !id.is_empty())
                .map(|video_id| VideoMatch { video_id, title })
        });

        debug!(found = found.is_some(), "YouTube search complete");
        Ok(found)
    }
}

#[async_trait]
impl VideoSearchClient for YouTubeConnector {
    async fn find_music_video(&self, query: &str) -> BridgeResult<Option<VideoMatch>> {
        Ok(self.search_music_video(query).await?)
    }
}
