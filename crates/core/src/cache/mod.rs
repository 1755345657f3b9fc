//! SQLite-backed revision ledger and content store.
//!
//! This module provides persistent storage for precached responses using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - A revision ledger keyed by canonical URL
//! - A content store of fetched responses with SHA-256 digests
//! - Automatic schema migrations
//! - WAL mode for concurrent access from several processes

pub mod connection;
pub mod content;
pub mod hash;
pub mod ledger;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use hash::content_digest;
