//! Fingerprint caching module for thumbfit.
//!
//! This module provides persistent storage for file fingerprints so that
//! repeated runs over an unchanged thumbnail set skip decoding entirely.
//!
//! # Architecture
//!
//! The caching system is split into two main components:
//!
//! * [`store`]: The concurrent in-memory map plus JSON load/save.
//! * [`entry`]: The `(meta_hash, content_hash)` record stored per path.
//!
//! # Persistence
//!
//! * A missing cache file means an empty store.
//! * A corrupt cache file is logged and discarded as a whole.
//! * Saves are atomic (temp file + rename) and failures are logged, never
//!   propagated to the batch.

pub mod entry;
pub mod store;

use std::path::PathBuf;

pub use entry::CacheEntry;
pub use store::{CacheStore, DEFAULT_CACHE_FILE};

/// Errors that can occur while loading or saving the cache document.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// The cache file could not be read or written.
    #[error("Cache I/O error for {path}: {source}")]
    Io {
        /// Path of the cache document
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The cache file exists but is not a valid cache document.
    #[error("Corrupt cache file {path}: {source}")]
    Parse {
        /// Path of the cache document
        path: PathBuf,
        /// The underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory map could not be serialized (e.g. a non UTF-8 path).
    #[error("Failed to serialize cache: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
