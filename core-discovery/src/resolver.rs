//! Catalog resolution: free-text (title, artist) pair to a concrete catalog entry

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::music::{AccessToken, CatalogCandidate, SearchServiceClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::deadline::within;

/// Only the top search hit is ever considered
const SEARCH_LIMIT: u32 = 1;

/// Fielded search query for a title/artist pair
pub fn build_query(title: &str, artist_name: &str) -> String {
    format!("track:{} artist:{}", title, artist_name)
}

/// Resolves similarity candidates against the streaming catalog
#[derive(Clone)]
pub struct CatalogResolver {
    client: Arc<dyn SearchServiceClient>,
    call_timeout: Duration,
}

impl CatalogResolver {
    pub fn new(client: Arc<dyn SearchServiceClient>, call_timeout: Duration) -> Self {
        Self {
            client,
            call_timeout,
        }
    }

    /// Search the catalog and return the first hit, surfacing failures
    ///
    /// `Ok(None)` means the search succeeded but found nothing.
    pub async fn try_resolve(
        &self,
        title: &str,
        artist_name: &str,
        token: &AccessToken,
    ) -> BridgeResult<Option<CatalogCandidate>> {
        let query = build_query(title, artist_name);
        let hits = within(
            self.call_timeout,
            "catalog search",
            self.client.search_tracks(&query, SEARCH_LIMIT, token),
        )
        .await?;

        Ok(hits.into_iter().next())
    }

    /// Resolve a candidate, absorbing every failure as "no match"
    #[instrument(skip(self, token))]
    pub async fn resolve(
        &self,
        title: &str,
        artist_name: &str,
        token: &AccessToken,
    ) -> Option<CatalogCandidate> {
        match self.try_resolve(title, artist_name, token).await {
            Ok(Some(candidate)) => {
                debug!(catalog_id = %candidate.catalog_id, "Resolved catalog entry");
                Some(candidate)
            }
            Ok(None) => {
                debug!("No catalog match");
                None
            }
            Err(e) => {
                warn!(error = %e, "Catalog search failed, dropping candidate");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query() {
        assert_eq!(
            build_query("Song B", "Artist Y"),
            "track:Song B artist:Artist Y"
        );
    }
}
