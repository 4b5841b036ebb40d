//! Cache generation management.
//!
//! Every deploy runs under a single cache generation. Store names embed the
//! generation identifier so stores from different generations never collide
//! and stale ones can be enumerated for eviction at cutover.

/// Prefix shared by every store this gateway owns.
pub const STORE_PREFIX: &str = "inkgate";

/// Deploy-time default generation identifier.
pub const DEFAULT_GENERATION: &str = concat!("v", env!("CARGO_PKG_VERSION"));

/// The store names belonging to one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNames {
    /// General responses: API payloads, navigations, scripts, styles.
    pub primary: String,
    /// Large media assets, refreshed in the background.
    pub media: String,
}

impl StoreNames {
    /// Whether `name` belongs to this generation.
    pub fn contains(&self, name: &str) -> bool {
        name == self.primary || name == self.media
    }
}

/// Derive the store names for a generation.
pub fn store_names(generation: &str) -> StoreNames {
    StoreNames {
        primary: format!("{STORE_PREFIX}-primary-{generation}"),
        media: format!("{STORE_PREFIX}-media-{generation}"),
    }
}

/// Compute which existing stores are stale relative to the current generation.
///
/// Only names carrying the inkgate prefix are considered; anything else in
/// the database is not ours to delete.
pub fn stale_names(all: &[String], current: &StoreNames) -> Vec<String> {
    all.iter()
        .filter(|name| name.starts_with(STORE_PREFIX) && !current.contains(name))
        .cloned()
        .collect()
}
