//! Core types and shared functionality for the precache engine.
//!
//! This crate provides:
//! - Manifest normalization and the URL-keyed precache list
//! - Store contracts for the revision ledger and content store
//! - A SQLite backend implementing both stores
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod manifest;
pub mod store;

pub use cache::CacheDb;
pub use config::{ConfigError, PrecacheConfig};
pub use error::Error;
pub use manifest::{EntryRef, ManifestEntry, PrecacheList};
pub use store::{ContentStore, RevisionLedger, StoredResponse};
