//! xxHash64 fingerprints for change detection.
//!
//! # Overview
//!
//! Two fingerprints are computed for every tracked file:
//!
//! * **Metadata fingerprint**: digest of a 16-byte buffer holding the file
//!   length and the modification time. Costs one `stat`.
//! * **Content fingerprint**: digest of the full byte stream, read in
//!   fixed-size chunks through a streaming [`Xxh64`] state.
//!
//! Neither is cryptographic. Collisions are treated as negligible.
//!
//! # Example
//!
//! ```no_run
//! use thumbfit::scanner::hasher::{content_fingerprint, metadata_fingerprint};
//! use std::path::Path;
//!
//! let path = Path::new("thumbnail.png");
//! let meta = metadata_fingerprint(path).unwrap();
//! let content = content_fingerprint(path).unwrap();
//! println!("{meta:016x} {content:016x}");
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use xxhash_rust::xxh64::{xxh64, Xxh64};

use super::FingerprintError;

/// Default read buffer for content hashing (8 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

const SEED: u64 = 0;

/// Streaming content fingerprinter with a configurable read buffer.
///
/// The chunk size only affects I/O granularity: the same bytes always
/// produce the same digest regardless of how they are split.
#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter {
    chunk_size: usize,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl Fingerprinter {
    /// Create a fingerprinter using [`DEFAULT_CHUNK_SIZE`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Use a custom read buffer size (minimum 1 byte).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Get the configured read buffer size.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Fingerprint everything readable from `reader`.
    pub fn digest_reader<R: Read>(&self, mut reader: R) -> io::Result<u64> {
        let mut state = Xxh64::new(SEED);
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            state.update(&buffer[..read]);
        }

        Ok(state.digest())
    }

    /// Fingerprint the full content of the file at `path`.
    ///
    /// The file is opened read-only and closed when this returns, on the
    /// error path included.
    pub fn digest_file(&self, path: &Path) -> Result<u64, FingerprintError> {
        let file = File::open(path).map_err(|e| FingerprintError::io(path, e))?;
        self.digest_reader(file).map_err(|e| FingerprintError::io(path, e))
    }
}

/// Fingerprint of a file's length and modification time.
///
/// # Errors
///
/// Returns [`FingerprintError::Io`] if the metadata cannot be read, including
/// when the file vanished after the caller checked that it exists.
pub fn metadata_fingerprint(path: &Path) -> Result<u64, FingerprintError> {
    let metadata = std::fs::metadata(path).map_err(|e| FingerprintError::io(path, e))?;
    let modified = metadata
        .modified()
        .map_err(|e| FingerprintError::io(path, e))?;

    Ok(digest_metadata(metadata.len(), modified))
}

/// Fingerprint of a file's full content using [`DEFAULT_CHUNK_SIZE`] reads.
pub fn content_fingerprint(path: &Path) -> Result<u64, FingerprintError> {
    Fingerprinter::new().digest_file(path)
}

/// Fingerprint of a byte stream using [`DEFAULT_CHUNK_SIZE`] reads.
pub fn content_fingerprint_reader<R: Read>(reader: R) -> io::Result<u64> {
    Fingerprinter::new().digest_reader(reader)
}

/// One-shot digest of an in-memory buffer.
///
/// Equal to streaming the same bytes through [`Fingerprinter`].
#[must_use]
pub fn digest_bytes(bytes: &[u8]) -> u64 {
    xxh64(bytes, SEED)
}

/// Digest `(len, modified)` packed as 8 + 8 little-endian bytes.
#[must_use]
pub fn digest_metadata(len: u64, modified: SystemTime) -> u64 {
    digest_bytes(&pack_metadata(len, modified))
}

/// Pack file length and modification time into the 16-byte metadata buffer.
///
/// The timestamp is stored as signed nanoseconds relative to the Unix epoch,
/// saturating at the `i64` range.
#[must_use]
pub fn pack_metadata(len: u64, modified: SystemTime) -> [u8; 16] {
    let mut buffer = [0u8; 16];
    buffer[..8].copy_from_slice(&len.to_le_bytes());
    buffer[8..].copy_from_slice(&timestamp_ticks(modified).to_le_bytes());
    buffer
}

fn timestamp_ticks(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_nanos())
            .map(|n| -n)
            .unwrap_or(i64::MIN),
    }
}
