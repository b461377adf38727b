//! Liked-status lookup for a batch of catalog entries
//!
//! The lookup fails open: any failure (transport, timeout, a response of the
//! wrong length) yields `false` for every id so recommendations are still
//! returned, just without liked annotations.

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::music::{AccessToken, LikeCheckServiceClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::deadline::within;

/// Largest id list the streaming service accepts per request
pub const MAX_IDS_PER_REQUEST: usize = 50;

#[derive(Clone)]
pub struct LikedStatusBatcher {
    client: Arc<dyn LikeCheckServiceClient>,
    call_timeout: Duration,
}

impl LikedStatusBatcher {
    pub fn new(client: Arc<dyn LikeCheckServiceClient>, call_timeout: Duration) -> Self {
        Self {
            client,
            call_timeout,
        }
    }

    /// Liked flags positionally aligned with `catalog_ids`
    ///
    /// The result always has the same length as the input. An empty input
    /// returns immediately without calling the service.
    #[instrument(skip(self, catalog_ids, token), fields(id_count = catalog_ids.len()))]
    pub async fn check_liked(&self, catalog_ids: &[String], token: &AccessToken) -> Vec<bool> {
        if catalog_ids.is_empty() {
            return Vec::new();
        }

        match self.try_check_liked(catalog_ids, token).await {
            Ok(flags) => {
                debug!(
                    liked = flags.iter().filter(|&&liked| liked).count(),
                    "Liked status fetched"
                );
                flags
            }
            Err(e) => {
                warn!(error = %e, "Liked-status check failed, defaulting to not liked");
                vec![false; catalog_ids.len()]
            }
        }
    }

    /// Query the service chunk by chunk, failing on the first bad chunk
    pub async fn try_check_liked(
        &self,
        catalog_ids: &[String],
        token: &AccessToken,
    ) -> BridgeResult<Vec<bool>> {
        let mut flags = Vec::with_capacity(catalog_ids.len());

        for chunk in catalog_ids.chunks(MAX_IDS_PER_REQUEST) {
            let chunk_flags = within(
                self.call_timeout,
                "liked-status check",
                self.client.contains(chunk, token),
            )
            .await?;

            if chunk_flags.len() != chunk.len() {
                return Err(BridgeError::OperationFailed(format!(
                    "liked-status response has {} flags for {} ids",
                    chunk_flags.len(),
                    chunk.len()
                )));
            }
            flags.extend(chunk_flags);
        }

        Ok(flags)
    }
}
