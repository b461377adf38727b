//! # Taste Aggregation
//!
//! Turns a listener's seed tracks into a ranked list of descriptive tags.
//!
//! For every seed the tagging service is asked for the top tags of the
//! seed's artist. Tags are normalized (trimmed, lowercased), counted across
//! all seeds, and ranked by descending frequency. Ties keep the order in
//! which a tag was first seen while walking the seeds, so the ranking is
//! deterministic for a given input. A seed whose lookup fails contributes
//! nothing; the aggregation itself never fails.
//!
//! Repeated artists are queried once per seed. An artist that appears in
//! several top tracks therefore weighs more heavily in the ranking.

use bridge_traits::music::{SeedTrack, Tag, TaggingServiceClient};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::deadline::within;

/// Insertion-ordered tag frequency table
#[derive(Debug, Clone, Default)]
pub struct TagTally {
    entries: Vec<(Tag, usize)>,
    index: HashMap<Tag, usize>,
}

impl TagTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `raw`. Blank tags are ignored.
    pub fn record(&mut self, raw: &str) {
        let tag = normalize_tag(raw);
        if tag.is_empty() {
            return;
        }

        match self.index.get(&tag) {
            Some(&position) => self.entries[position].1 += 1,
            None => {
                self.index.insert(tag.clone(), self.entries.len());
                self.entries.push((tag, 1));
            }
        }
    }

    pub fn record_all<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self.record(tag.as_ref());
        }
    }

    /// Occurrences of a tag (matched case-insensitively)
    pub fn count(&self, tag: &str) -> usize {
        self.index
            .get(&normalize_tag(tag))
            .map(|&position| self.entries[position].1)
            .unwrap_or(0)
    }

    /// Number of distinct tags
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// All tags with their counts, most frequent first, first-seen order on ties
    pub fn ranked(&self) -> Vec<(Tag, usize)> {
        let mut ranked = self.entries.clone();
        // `sort_by` is stable, which keeps first-seen order among equal counts
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// The `top_n` highest-ranked tags
    pub fn top(&self, top_n: usize) -> Vec<Tag> {
        self.ranked()
            .into_iter()
            .take(top_n)
            .map(|(tag, _)| tag)
            .collect()
    }
}

/// Trim and lowercase a tag as supplied by the tagging service
pub fn normalize_tag(raw: &str) -> Tag {
    raw.trim().to_lowercase()
}

/// Aggregates artist tags across a set of seed tracks
#[derive(Clone)]
pub struct TagAggregator {
    client: Arc<dyn TaggingServiceClient>,
    call_timeout: Duration,
    concurrency: usize,
}

impl TagAggregator {
    pub fn new(client: Arc<dyn TaggingServiceClient>, call_timeout: Duration) -> Self {
        Self {
            client,
            call_timeout,
            concurrency: 1,
        }
    }

    /// Allow up to `limit` tag lookups in flight at once (minimum 1).
    ///
    /// Results are still folded in seed order, so the ranking does not
    /// depend on which lookup finishes first.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Count tags across all seeds
    #[instrument(skip(self, seeds), fields(seed_count = seeds.len()))]
    pub async fn tally(&self, seeds: &[SeedTrack]) -> TagTally {
        let lookups: Vec<Vec<Tag>> = stream::iter(seeds.iter())
            .map(|seed| self.tags_for_seed(seed))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut tally = TagTally::new();
        for tags in &lookups {
            tally.record_all(tags);
        }

        debug!(
            distinct_tags = tally.len(),
            total_tags = tally.total(),
            "Tag tally complete"
        );
        tally
    }

    /// The `top_n` most frequent tags across all seeds
    ///
    /// Never fails: seeds whose lookup fails or times out are skipped, and an
    /// empty seed list yields an empty result.
    #[instrument(skip(self, seeds), fields(seed_count = seeds.len()))]
    pub async fn aggregate(&self, seeds: &[SeedTrack], top_n: usize) -> Vec<Tag> {
        if seeds.is_empty() {
            debug!("No seeds supplied, nothing to aggregate");
            return Vec::new();
        }

        let top = self.tally(seeds).await.top(top_n);
        info!(tag_count = top.len(), "Taste profile aggregated");
        top
    }

    async fn tags_for_seed(&self, seed: &SeedTrack) -> Vec<Tag> {
        let lookup = within(
            self.call_timeout,
            "tag lookup",
            self.client.top_tags_for_artist(&seed.artist_name),
        )
        .await;

        match lookup {
            Ok(tags) => {
                debug!(artist = %seed.artist_name, tag_count = tags.len(), "Fetched artist tags");
                tags
            }
            Err(e) => {
                warn!(artist = %seed.artist_name, error = %e, "Tag lookup failed, skipping seed");
                Vec::new()
            }
        }
    }
}
