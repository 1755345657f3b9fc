//! Cleanup engine: remove stored URLs that left the manifest.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::PrecacheManager;
use precache_core::Error;

/// URLs removed by a cleanup pass, in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub removed: Vec<String>,
}

impl PrecacheManager {
    /// Delete every stored URL that is not in the current list.
    ///
    /// Candidates are the ledger's URLs plus any content-store URLs, so a
    /// response whose ledger write never landed is pruned too. For each
    /// orphan the response goes first and the ledger record last; if a
    /// deletion fails the error is returned at once and a later call picks
    /// up what remains. Listed URLs are never touched.
    pub async fn cleanup(&self) -> Result<CleanupReport, Error> {
        let keep = self.list.urls();

        let mut candidates: BTreeSet<String> = self.ledger.revision_urls().await?.into_iter().collect();
        candidates.extend(self.content.response_urls().await?);

        let orphans: Vec<String> = candidates.into_iter().filter(|url| !keep.contains(url.as_str())).collect();

        for url in &orphans {
            self.content.delete_response(url).await?;
            self.ledger.delete_revision(url).await?;
            tracing::debug!(url = %url, "removed orphaned precache entry");
        }

        tracing::info!(removed = orphans.len(), kept = keep.len(), "precache cleanup complete");
        Ok(CleanupReport { removed: orphans })
    }
}
