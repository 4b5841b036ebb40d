//! Core types and shared functionality for inkgate.
//!
//! This crate provides:
//! - Versioned cache stores with a SQLite backend
//! - Cache generation management
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod store;
pub mod version;

pub use config::AppConfig;
pub use error::Error;
pub use store::{CacheDb, Store, StoredResponse};
pub use version::StoreNames;
