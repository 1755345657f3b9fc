//! Content digests for stored responses.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a response body.
pub fn content_digest(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    hex::encode(hasher.finalize())
}
