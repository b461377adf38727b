//! # Similarity Resolution Pipeline
//!
//! Produces "more like this" recommendations for a seed track:
//!
//! ```text
//! seed ──> similarity service (K candidates)
//!            │
//!            ├──> catalog search per candidate (bounded fan-out)
//!            │       unresolved / failed candidates are dropped
//!            │
//!            └──> one liked-status batch for the resolved ids
//!                    failure => every flag false
//! ```
//!
//! Output order always follows the similarity service's ranking. Lookups run
//! concurrently and may finish in any order; each result is written into the
//! slot of the candidate it belongs to before unresolved slots are removed.
//!
//! Only the similarity query is allowed to fail the whole invocation. An
//! empty similarity response is a valid, empty recommendation list.

use bridge_traits::error::BridgeError;
use bridge_traits::music::{
    AccessToken, CatalogCandidate, EnrichedTrack, LikeCheckServiceClient, SearchServiceClient,
    SeedTrack, SimilarCandidate, SimilarityServiceClient,
};
use core_runtime::config::DiscoveryConfig;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::deadline::within;
use crate::error::{DiscoveryError, Result};
use crate::liked::LikedStatusBatcher;
use crate::resolver::CatalogResolver;

#[derive(Clone)]
pub struct SimilarityResolutionPipeline {
    similarity: Arc<dyn SimilarityServiceClient>,
    resolver: CatalogResolver,
    liked: Option<LikedStatusBatcher>,
    similar_limit: u32,
    call_timeout: Duration,
    max_concurrent: usize,
}

impl SimilarityResolutionPipeline {
    pub fn new(
        similarity: Arc<dyn SimilarityServiceClient>,
        search: Arc<dyn SearchServiceClient>,
        like_check: Arc<dyn LikeCheckServiceClient>,
        config: &DiscoveryConfig,
    ) -> Self {
        Self {
            similarity,
            resolver: CatalogResolver::new(search, config.call_timeout),
            liked: Some(LikedStatusBatcher::new(like_check, config.call_timeout)),
            similar_limit: config.similar_limit,
            call_timeout: config.call_timeout,
            max_concurrent: config.max_concurrent_resolutions.max(1),
        }
    }

    /// Skip the liked-status lookup; every track is reported as not liked
    pub fn without_liked_status(mut self) -> Self {
        self.liked = None;
        self
    }

    /// Recommendations similar to `seed`, resolved and annotated
    ///
    /// # Errors
    /// - [`DiscoveryError::InvalidInput`] if the seed has a blank title or artist
    /// - [`DiscoveryError::Timeout`] if the similarity query exceeds the call timeout
    /// - [`DiscoveryError::RecommendationFailed`] if the similarity query fails
    #[instrument(skip(self, seed, token), fields(title = %seed.title, artist = %seed.artist_name))]
    pub async fn run(&self, seed: &SeedTrack, token: &AccessToken) -> Result<Vec<EnrichedTrack>> {
        if seed.title.trim().is_empty() || seed.artist_name.trim().is_empty() {
            return Err(DiscoveryError::InvalidInput(
                "seed track requires a title and an artist".to_string(),
            ));
        }

        let candidates = self.similar_candidates(seed).await?;
        if candidates.is_empty() {
            info!("Similarity service returned no candidates");
            return Ok(Vec::new());
        }

        let resolved = self.resolve_all(&candidates, token).await;
        if resolved.is_empty() {
            info!(
                candidates = candidates.len(),
                "No candidate resolved to a catalog entry"
            );
            return Ok(Vec::new());
        }

        let flags = self.liked_flags(&resolved, token).await;
        let tracks: Vec<EnrichedTrack> = resolved
            .into_iter()
            .zip(flags)
            .map(|(track, is_liked)| EnrichedTrack::new(track, is_liked))
            .collect();

        info!(
            candidates = candidates.len(),
            resolved = tracks.len(),
            "Recommendations resolved"
        );
        Ok(tracks)
    }

    async fn similar_candidates(&self, seed: &SeedTrack) -> Result<Vec<SimilarCandidate>> {
        let query = within(
            self.call_timeout,
            "similarity query",
            self.similarity
                .similar_tracks(&seed.artist_name, &seed.title, self.similar_limit),
        )
        .await;

        let mut candidates = match query {
            Ok(candidates) => candidates,
            Err(BridgeError::Timeout(message)) => {
                warn!(%message, "Similarity query timed out");
                return Err(DiscoveryError::Timeout {
                    operation: "similarity query".to_string(),
                    timeout_ms: self.call_timeout.as_millis() as u64,
                });
            }
            Err(e) => {
                warn!(error = %e, "Similarity query failed");
                return Err(DiscoveryError::RecommendationFailed(e));
            }
        };

        candidates.truncate(self.similar_limit as usize);
        debug!(count = candidates.len(), "Similarity candidates fetched");
        Ok(candidates)
    }

    /// Resolve every candidate, keeping the input order of the ones that resolve
    async fn resolve_all(
        &self,
        candidates: &[SimilarCandidate],
        token: &AccessToken,
    ) -> Vec<CatalogCandidate> {
        let lookups: Vec<_> = candidates
            .iter()
            .enumerate()
            .map(|(position, candidate)| async move {
                let resolved = self
                    .resolver
                    .resolve(&candidate.title, &candidate.artist_name, token)
                    .await;
                (position, resolved)
            })
            .collect();
        let completed: Vec<(usize, Option<CatalogCandidate>)> =
            stream::iter(lookups)
                .buffer_unordered(self.max_concurrent)
                .collect()
                .await;

        let mut slots: Vec<Option<CatalogCandidate>> = vec![None; candidates.len()];
        for (position, resolved) in completed {
            slots[position] = resolved;
        }

        slots.into_iter().flatten().collect()
    }

    async fn liked_flags(&self, resolved: &[CatalogCandidate], token: &AccessToken) -> Vec<bool> {
        let Some(batcher) = &self.liked else {
            return vec![false; resolved.len()];
        };

        let ids: Vec<String> = resolved
            .iter()
            .map(|track| track.catalog_id.clone())
            .collect();
        batcher.check_liked(&ids, token).await
    }
}
