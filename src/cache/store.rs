//! JSON-backed fingerprint store.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{CacheEntry, CacheError, CacheResult};
use crate::atomic;

/// Default cache document name, resolved against the working directory.
pub const DEFAULT_CACHE_FILE: &str = "textureCache.json";

/// In-memory map from file path to its last-known fingerprints.
///
/// Loaded once from a JSON document and written back on demand with
/// [`CacheStore::save`]. The map is guarded by a [`RwLock`] so batch workers
/// can read and write entries concurrently through a shared reference.
///
/// Entries are never removed; stale paths are harmless.
#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
    saves: AtomicUsize,
}

impl CacheStore {
    /// Create an empty store that will persist to `path`.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(HashMap::new()),
            saves: AtomicUsize::new(0),
        }
    }

    /// Load the store persisted at `path`.
    ///
    /// A missing file yields an empty store. An unreadable or corrupt file is
    /// logged and also yields an empty store; entries are never partially
    /// imported.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::try_load(&path) {
            Ok(store) => {
                log::debug!(
                    "Loaded {} cache entries from {}",
                    store.len(),
                    path.display()
                );
                store
            }
            Err(e) => {
                log::error!("Failed to load fingerprint cache, starting empty: {}", e);
                Self::empty(path)
            }
        }
    }

    /// Load the store persisted at `path`, reporting why it could not be read.
    ///
    /// A missing file is not an error.
    pub fn try_load(path: &Path) -> CacheResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No cache file at {}, starting empty", path.display());
                return Ok(Self::empty(path));
            }
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let entries: HashMap<PathBuf, CacheEntry> =
            serde_json::from_str(&content).map_err(|source| CacheError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
            saves: AtomicUsize::new(0),
        })
    }

    /// Path this store persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the entry for `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<CacheEntry> {
        self.read().get(path).copied()
    }

    /// Insert or replace the entry for `path`.
    pub fn set(&self, path: &Path, entry: CacheEntry) {
        self.write().insert(path.to_path_buf(), entry);
    }

    /// Number of tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no path is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Number of successful saves since this store was created.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// Copy of all entries, ordered by path.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<PathBuf, CacheEntry> {
        self.read()
            .iter()
            .map(|(path, entry)| (path.clone(), *entry))
            .collect()
    }

    /// Persist to [`CacheStore::path`], logging any failure.
    ///
    /// Returns true if the document was written.
    pub fn save(&self) -> bool {
        self.save_to(&self.path)
    }

    /// Persist to `path`, logging any failure.
    ///
    /// Returns true if the document was written.
    pub fn save_to(&self, path: &Path) -> bool {
        match self.try_save_to(path) {
            Ok(count) => {
                log::debug!("Saved {} cache entries to {}", count, path.display());
                true
            }
            Err(e) => {
                log::error!("Failed to save fingerprint cache: {}", e);
                false
            }
        }
    }

    /// Persist to `path` atomically, returning the number of entries written.
    ///
    /// The document is rendered in memory first, then swapped in with a
    /// temp file and rename so a reader never sees a half-written cache.
    pub fn try_save_to(&self, path: &Path) -> CacheResult<usize> {
        let snapshot = self.snapshot();
        let json = serde_json::to_vec(&snapshot).map_err(CacheError::Serialize)?;

        atomic::replace_file(path, |writer| writer.write_all(&json)).map_err(|source| {
            CacheError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;

        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(snapshot.len())
    }

    // Entries are plain data, so a panic in another worker cannot leave
    // them half-updated; poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
