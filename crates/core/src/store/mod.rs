//! SQLite-backed versioned cache stores.
//!
//! This module provides the durable request/response cache using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Named stores scoped to a cache generation
//! - Request-keyed entries (method + canonical URL, SHA-256)
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Wholesale store deletion at generation cutover

pub mod connection;
pub mod entries;
pub mod key;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{Store, StoredResponse};
