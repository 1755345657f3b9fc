//! Manifest normalization and the in-memory precache list.
//!
//! Raw `{url, revision}` declarations are validated once, resolved against a
//! base URL, and merged into a [`PrecacheList`] keyed by canonical URL.

pub mod entry;
pub mod list;
pub mod resolve;

pub use entry::{EntryRef, ManifestEntry, REVISIONED_FILES_FIELD, parse_manifest};
pub use list::PrecacheList;
pub use resolve::{UrlError, resolve_url};
