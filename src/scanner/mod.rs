//! Scanner module for thumbnail discovery and file fingerprinting.
//!
//! This module provides functionality for:
//! - Finding mod thumbnails one directory level below each mod root
//! - Metadata and content fingerprints with xxHash64
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`discover`]: Mod directory traversal and thumbnail lookup
//! - [`hasher`]: xxHash64 fingerprints (metadata and streamed content)
//!
//! # Example
//!
//! ```no_run
//! use thumbfit::scanner::{discover_thumbnails, DiscoveryConfig};
//! use std::path::PathBuf;
//!
//! let config = DiscoveryConfig {
//!     workshop_roots: vec![PathBuf::from("/games/mods/workshop")],
//!     ..Default::default()
//! };
//!
//! for path in discover_thumbnails(&config) {
//!     println!("{}", path.display());
//! }
//! ```

pub mod discover;
pub mod hasher;

use std::path::{Path, PathBuf};

// Re-export main types
pub use discover::{discover_thumbnails, DiscoveryConfig, DEFAULT_THUMBNAIL_NAME};
pub use hasher::{content_fingerprint, metadata_fingerprint, Fingerprinter, DEFAULT_CHUNK_SIZE};

/// Errors that can occur while fingerprinting a file.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// An I/O error occurred while reading metadata or content.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl FingerprintError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
