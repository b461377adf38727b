//! Shared test doubles for the discovery integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::music::{
    AccessToken, CatalogCandidate, LikeCheckServiceClient, SearchServiceClient, SeedTrack,
    SimilarCandidate, SimilarityServiceClient,
};
use core_runtime::config::DiscoveryConfig;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn token() -> AccessToken {
    AccessToken::new("test-token")
}

pub fn config() -> DiscoveryConfig {
    DiscoveryConfig {
        call_timeout: Duration::from_secs(2),
        ..DiscoveryConfig::default()
    }
}

pub fn entry(id: &str, name: &str, artist: &str) -> CatalogCandidate {
    CatalogCandidate {
        catalog_id: id.to_string(),
        name: name.to_string(),
        artist_name: artist.to_string(),
        album_art_url: Some(format!("https://img.example/{}.jpg", id)),
        playable_uri: format!("spotify:track:{}", id),
    }
}

pub fn ids(tracks: &[bridge_traits::music::EnrichedTrack]) -> Vec<String> {
    tracks.iter().map(|t| t.catalog_id().to_string()).collect()
}

/// Similarity double returning a fixed list, a failure, or a slow answer
#[derive(Default)]
pub struct FakeSimilarity {
    candidates: Vec<SimilarCandidate>,
    fail_status: Option<u16>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub limits: Mutex<Vec<u32>>,
}

impl FakeSimilarity {
    pub fn returning(candidates: Vec<SimilarCandidate>) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SimilarityServiceClient for FakeSimilarity {
    async fn similar_tracks(
        &self,
        _artist_name: &str,
        _title: &str,
        limit: u32,
    ) -> Result<Vec<SimilarCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.limits.lock().unwrap().push(limit);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(status) = self.fail_status {
            return Err(BridgeError::Http {
                status,
                message: "similarity unavailable".to_string(),
            });
        }
        Ok(self.candidates.clone())
    }
}

/// Catalog double keyed by title, with per-title latency and failures
#[derive(Default)]
pub struct FakeCatalog {
    entries: HashMap<String, CatalogCandidate>,
    delays: HashMap<String, Duration>,
    failures: HashSet<String>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, title: &str, candidate: CatalogCandidate) -> Self {
        self.entries.insert(title.to_string(), candidate);
        self
    }

    pub fn with_delay(mut self, title: &str, delay: Duration) -> Self {
        self.delays.insert(title.to_string(), delay);
        self
    }

    pub fn with_failure(mut self, title: &str) -> Self {
        self.failures.insert(title.to_string());
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    fn title_of(query: &str) -> String {
        query
            .strip_prefix("track:")
            .and_then(|rest| rest.split(" artist:").next())
            .unwrap_or(query)
            .to_string()
    }
}

#[async_trait]
impl SearchServiceClient for FakeCatalog {
    async fn search_tracks(
        &self,
        query: &str,
        _limit: u32,
        _token: &AccessToken,
    ) -> Result<Vec<CatalogCandidate>> {
        self.queries.lock().unwrap().push(query.to_string());
        let title = Self::title_of(query);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&title) {
            tokio::time::sleep(*delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failures.contains(&title) {
            return Err(BridgeError::OperationFailed(format!("search for {} failed", title)));
        }
        Ok(self.entries.get(&title).cloned().into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikesMode {
    Answer,
    Fail,
    ShortResponse,
}

/// Like-check double that records every batch it receives
pub struct FakeLikes {
    liked: HashSet<String>,
    mode: LikesMode,
    pub batches: Mutex<Vec<Vec<String>>>,
}

impl FakeLikes {
    pub fn liking(ids: &[&str]) -> Self {
        Self {
            liked: ids.iter().map(|id| id.to_string()).collect(),
            mode: LikesMode::Answer,
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_mode(mut self, mode: LikesMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl LikeCheckServiceClient for FakeLikes {
    async fn contains(&self, catalog_ids: &[String], _token: &AccessToken) -> Result<Vec<bool>> {
        self.batches.lock().unwrap().push(catalog_ids.to_vec());

        match self.mode {
            LikesMode::Fail => Err(BridgeError::Http {
                status: 502,
                message: "bad gateway".to_string(),
            }),
            LikesMode::ShortResponse => Ok(vec![true]),
            LikesMode::Answer => Ok(catalog_ids
                .iter()
                .map(|id| self.liked.contains(id))
                .collect()),
        }
    }
}

pub fn seed(title: &str, artist: &str) -> SeedTrack {
    SeedTrack::new(title, artist)
}
