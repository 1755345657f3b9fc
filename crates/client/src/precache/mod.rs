//! Precache reconciliation: install stale entries, prune orphans.
//!
//! A [`PrecacheManager`] owns one [`PrecacheList`] built synchronously by the
//! caller, plus handles to the durable ledger, content store, and fetcher.
//! The stores may be shared with other managers (a previous process, or a
//! second instance during a handoff); nothing here takes exclusive locks.

pub mod cleanup;
pub mod install;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use serde_json::Value;

use crate::fetch::{FetchClient, FetchConfig, Fetcher};
use precache_core::{CacheDb, ContentStore, Error, ManifestEntry, PrecacheConfig, PrecacheList, RevisionLedger};

pub use cleanup::CleanupReport;
pub use install::InstallResult;

/// Reconciles a manifest against the revision ledger and content store.
pub struct PrecacheManager {
    list: PrecacheList,
    ledger: Arc<dyn RevisionLedger>,
    content: Arc<dyn ContentStore>,
    fetcher: Arc<dyn Fetcher>,
    cache_bust_param: String,
}

impl PrecacheManager {
    pub fn new(
        list: PrecacheList, ledger: Arc<dyn RevisionLedger>, content: Arc<dyn ContentStore>, fetcher: Arc<dyn Fetcher>,
        cache_bust_param: impl Into<String>,
    ) -> Self {
        Self { list, ledger, content, fetcher, cache_bust_param: cache_bust_param.into() }
    }

    /// Build a manager over `db` with an HTTP fetcher configured from `config`.
    pub fn from_config(config: &PrecacheConfig, db: CacheDb) -> Result<Self, Error> {
        let base = config.base().map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let fetcher = FetchClient::new(FetchConfig::from(config))?;
        let db = Arc::new(db);

        Ok(Self::new(PrecacheList::new(base), db.clone(), db, Arc::new(fetcher), config.cache_bust_param.clone()))
    }

    /// Validate and merge a raw manifest into this manager's list.
    ///
    /// See [`PrecacheList::add_entries`].
    pub fn add_entries(&mut self, manifest: &Value) -> Result<usize, Error> {
        self.list.add_entries(manifest)
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        self.list.entries()
    }

    pub fn list(&self) -> &PrecacheList {
        &self.list
    }
}
