//! Client code for the precache engine.
//!
//! This crate provides the HTTP fetch layer and the [`PrecacheManager`],
//! which installs manifest entries and prunes orphans from the durable
//! stores defined in `precache-core`.

pub mod fetch;
pub mod precache;

pub use fetch::{FetchClient, FetchConfig, FetchResponse, Fetcher};
pub use precache::{CleanupReport, InstallResult, PrecacheManager};
