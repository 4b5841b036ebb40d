//! Request-identity cache key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request.
///
/// The key is the SHA-256 of the method and the canonicalized,
/// origin-qualified URL, so `GET /api/posts?page=1` and
/// `GET /api/posts?page=2` never collide and mutating methods
/// key separately from reads.
pub fn entry_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
