//! Durable store contracts consumed by the installer and cleanup engine.
//!
//! Both stores are keyed by canonical URL and may be shared by several
//! manager instances at once; implementations must not assume exclusive
//! access. Deleting a missing key succeeds.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Durable record of the revision most recently installed per URL.
#[async_trait]
pub trait RevisionLedger: Send + Sync {
    /// Installed revision for `url`, if any.
    async fn get_revision(&self, url: &str) -> Result<Option<String>, Error>;

    /// Create or overwrite the record for `url`.
    async fn set_revision(&self, url: &str, revision: &str) -> Result<(), Error>;

    async fn delete_revision(&self, url: &str) -> Result<(), Error>;

    /// Every URL that has a record.
    async fn revision_urls(&self) -> Result<Vec<String>, Error>;
}

/// Durable response store keyed by canonical URL.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert or replace the response stored under `response.url`.
    async fn put_response(&self, response: &StoredResponse) -> Result<(), Error>;

    async fn get_response(&self, url: &str) -> Result<Option<StoredResponse>, Error>;

    async fn delete_response(&self, url: &str) -> Result<(), Error>;

    /// Every URL that has a stored response.
    async fn response_urls(&self) -> Result<Vec<String>, Error>;
}

/// A fetched response as persisted in the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    /// Canonical URL; never carries a cache-busting parameter.
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    /// Response headers as a JSON object of name to value.
    pub headers_json: Option<String>,
    pub body: Vec<u8>,
    /// SHA-256 hex digest of `body`.
    pub digest: String,
    pub stored_at: String,
}
