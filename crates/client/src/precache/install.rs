//! Installer: fetch and store every entry whose revision is not yet installed.
//!
//! Each entry runs as its own tokio task, so all entries may be in flight at
//! once. Results are collected by awaiting the join handles in list order,
//! which keeps the output aligned with the manifest regardless of completion
//! order. Dropping the returned future detaches the tasks; writes they have
//! already issued still complete.
//!
//! Per entry the content store is written before the ledger. A crash between
//! the two leaves the old ledger value behind and the next install re-fetches.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use super::PrecacheManager;
use crate::fetch::{FetchResponse, Fetcher, cache_busted, same_origin};
use precache_core::cache::content_digest;
use precache_core::{ContentStore, Error, ManifestEntry, RevisionLedger, StoredResponse};

/// Outcome of installing one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallResult {
    pub url: String,
    pub revision: String,
    /// True iff a fetch and store happened during this call.
    pub was_updated: bool,
}

impl PrecacheManager {
    /// Install every entry and return the per-entry outcomes in list order.
    ///
    /// Failures are reported per entry as [`Error::PrecacheInstallFailure`];
    /// one failing entry never stops its siblings.
    pub async fn install_settled(&self) -> Vec<Result<InstallResult, Error>> {
        let handles: Vec<_> = self
            .list
            .entries()
            .iter()
            .cloned()
            .map(|entry| {
                let task = InstallTask {
                    ledger: Arc::clone(&self.ledger),
                    content: Arc::clone(&self.content),
                    fetcher: Arc::clone(&self.fetcher),
                    base: self.list.base().clone(),
                    cache_bust_param: self.cache_bust_param.clone(),
                };
                (entry.url.clone(), tokio::spawn(task.run(entry)))
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (url, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(Error::install_failure(url, Error::TaskFailed(e.to_string()))),
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Install every entry, failing if any entry failed.
    ///
    /// All entries settle before the call returns. On failure the error is
    /// [`Error::InstallFailed`] carrying each entry failure in list order;
    /// entries that succeeded stay installed.
    pub async fn install(&self) -> Result<Vec<InstallResult>, Error> {
        let outcomes = self.install_settled().await;
        let total = outcomes.len();

        let mut results = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => failures.push(e),
            }
        }

        let updated = results.iter().filter(|r| r.was_updated).count();

        if !failures.is_empty() {
            tracing::warn!(total, updated, failed = failures.len(), "precache install incomplete");
            return Err(Error::InstallFailed { failed: failures.len(), total, failures });
        }

        tracing::info!(total, updated, "precache install complete");
        Ok(results)
    }
}

/// Everything one spawned install needs, owned so the task is `'static`.
struct InstallTask {
    ledger: Arc<dyn RevisionLedger>,
    content: Arc<dyn ContentStore>,
    fetcher: Arc<dyn Fetcher>,
    base: Url,
    cache_bust_param: String,
}

impl InstallTask {
    async fn run(self, entry: ManifestEntry) -> Result<InstallResult, Error> {
        self.install_entry(&entry).await.map_err(|cause| {
            tracing::warn!(url = %entry.url, revision = %entry.revision, error = %cause, "precache entry failed");
            Error::install_failure(&entry.url, cause)
        })
    }

    async fn install_entry(&self, entry: &ManifestEntry) -> Result<InstallResult, Error> {
        let installed = self.ledger.get_revision(&entry.url).await?;

        if installed.as_deref() == Some(entry.revision.as_str()) {
            tracing::debug!(url = %entry.url, revision = %entry.revision, "precache entry is current");
            return Ok(InstallResult { url: entry.url.clone(), revision: entry.revision.clone(), was_updated: false });
        }

        let request_url = request_url(entry, &self.base, &self.cache_bust_param)?;
        let response = self.fetcher.fetch(&request_url).await?;

        if !response.status.is_success() {
            return Err(Error::HttpError(format!("status {}", response.status.as_u16())));
        }

        self.content.put_response(&stored_response(&entry.url, &response)).await?;
        self.ledger.set_revision(&entry.url, &entry.revision).await?;

        tracing::debug!(
            url = %entry.url,
            previous = ?installed,
            revision = %entry.revision,
            fetch_ms = response.fetch_ms,
            "precached entry"
        );

        Ok(InstallResult { url: entry.url.clone(), revision: entry.revision.clone(), was_updated: true })
    }
}

/// URL to fetch for `entry`: the canonical URL, busted when requested and same-origin.
pub(crate) fn request_url(entry: &ManifestEntry, base: &Url, cache_bust_param: &str) -> Result<Url, Error> {
    let url = Url::parse(&entry.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", entry.url)))?;

    if entry.cache_bust && same_origin(&url, base) {
        return Ok(cache_busted(&url, cache_bust_param, &entry.revision));
    }

    Ok(url)
}

/// Content-store record for a fetched response, keyed by the canonical URL.
fn stored_response(url: &str, response: &FetchResponse) -> StoredResponse {
    let headers: serde_json::Map<String, serde_json::Value> = response
        .headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.into())))
        .collect();

    StoredResponse {
        url: url.to_string(),
        status_code: response.status.as_u16(),
        content_type: response.content_type.clone(),
        headers_json: serde_json::to_string(&headers).ok(),
        body: response.bytes.to_vec(),
        digest: content_digest(&response.bytes),
        stored_at: chrono::Utc::now().to_rfc3339(),
    }
}
