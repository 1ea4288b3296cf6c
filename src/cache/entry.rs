//! Cache entry definitions.

use serde::{Deserialize, Serialize};

/// Last-known fingerprint pair for one file path.
///
/// Both hashes are always written together. A stale `meta_hash` paired with
/// a current `content_hash` is a normal state: the file was touched but its
/// bytes did not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Fingerprint of (file length, modification time).
    pub meta_hash: u64,
    /// Fingerprint of the full file content.
    pub content_hash: u64,
}

impl CacheEntry {
    /// Create a new entry from both fingerprints.
    #[must_use]
    pub fn new(meta_hash: u64, content_hash: u64) -> Self {
        Self {
            meta_hash,
            content_hash,
        }
    }
}
