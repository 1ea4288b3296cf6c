//! Change detection and batch resizing.
//!
//! # Overview
//!
//! This module wires the cache, the fingerprints and the image codec together:
//! 1. **Detect**: compare each path against the cache (see [`detector`])
//! 2. **Transform**: decode, resize and re-encode new or changed images
//! 3. **Flush**: save the cache once if any entry was written (see [`batch`])
//!
//! # Example
//!
//! ```no_run
//! use thumbfit::cache::CacheStore;
//! use thumbfit::codec::PngCodec;
//! use thumbfit::pipeline::{BatchConfig, BatchProcessor};
//! use std::path::PathBuf;
//!
//! let store = CacheStore::load("textureCache.json");
//! let processor = BatchProcessor::new(PngCodec::new(), BatchConfig::default());
//!
//! let paths = vec![PathBuf::from("/mods/a/thumbnail.png")];
//! let summary = processor.process_batch(&store, &paths);
//! println!("{} resized", summary.resized);
//! ```

pub mod batch;
pub mod detector;

pub use batch::{
    default_threads, BatchConfig, BatchProcessor, BatchSummary, PathOutcome,
    DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH,
};
pub use detector::{detect_change, needs_update, ChangeStatus};

use crate::codec::CodecError;
use crate::scanner::FingerprintError;

/// Errors that can occur while processing a single path.
///
/// These never escape the batch; they are logged with the path and counted.
#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    /// The file could not be fingerprinted.
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    /// The image could not be decoded or re-encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
}
