//! Two-tier change detection against the fingerprint cache.
//!
//! # Policy
//!
//! 1. A path that does not exist is [`ChangeStatus::Missing`].
//! 2. A path with no cache entry is fingerprinted fully and recorded as
//!    [`ChangeStatus::New`].
//! 3. If the metadata fingerprint matches the cached one the file is
//!    [`ChangeStatus::Unchanged`] without reading its content.
//! 4. Otherwise the content is hashed. Equal content means the file was only
//!    touched ([`ChangeStatus::Touched`], metadata hash refreshed); different
//!    content is [`ChangeStatus::Modified`] and both hashes are replaced.
//!
//! Step 3 trusts size + mtime. A rewrite that keeps both (possible on
//! filesystems with coarse timestamps) goes unnoticed. This is the accepted
//! price for never reading unchanged files.

use std::path::Path;

use crate::cache::{CacheEntry, CacheStore};
use crate::scanner::hasher::{content_fingerprint, metadata_fingerprint};
use crate::scanner::FingerprintError;

/// Outcome of comparing a file against its cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    /// The file does not exist.
    Missing,
    /// First sighting; a fresh entry was stored.
    New,
    /// Metadata fingerprint matches the cache.
    Unchanged,
    /// Metadata changed but content is identical; `meta_hash` was updated.
    Touched,
    /// Content changed; both hashes were updated.
    Modified,
}

impl ChangeStatus {
    /// Whether the file must go through the image transform.
    #[must_use]
    pub fn needs_processing(self) -> bool {
        matches!(self, Self::New | Self::Modified)
    }

    /// Whether the cache entry for the file was written.
    #[must_use]
    pub fn dirtied_cache(self) -> bool {
        matches!(self, Self::New | Self::Touched | Self::Modified)
    }
}

/// Compare `path` against `store`, updating its entry as a side effect.
///
/// # Errors
///
/// Returns [`FingerprintError::Io`] if the file exists but its metadata or
/// content cannot be read.
pub fn detect_change(store: &CacheStore, path: &Path) -> Result<ChangeStatus, FingerprintError> {
    if !path.exists() {
        return Ok(ChangeStatus::Missing);
    }

    let meta_hash = metadata_fingerprint(path)?;

    let Some(entry) = store.get(path) else {
        let content_hash = content_fingerprint(path)?;
        store.set(path, CacheEntry::new(meta_hash, content_hash));
        log::debug!("No cache entry for {} (stored content hash)", path.display());
        return Ok(ChangeStatus::New);
    };

    if entry.meta_hash == meta_hash {
        return Ok(ChangeStatus::Unchanged);
    }

    let content_hash = content_fingerprint(path)?;
    if content_hash == entry.content_hash {
        store.set(path, CacheEntry::new(meta_hash, entry.content_hash));
        log::debug!(
            "Only metadata changed for {}, content identical",
            path.display()
        );
        Ok(ChangeStatus::Touched)
    } else {
        store.set(path, CacheEntry::new(meta_hash, content_hash));
        log::debug!("Content changed for {} (updated content hash)", path.display());
        Ok(ChangeStatus::Modified)
    }
}

/// Whether `path` needs reprocessing.
///
/// Thin wrapper over [`detect_change`]; the cache is updated the same way.
pub fn needs_update(store: &CacheStore, path: &Path) -> Result<bool, FingerprintError> {
    detect_change(store, path).map(ChangeStatus::needs_processing)
}
