//! Parallel batch over thumbnail paths.
//!
//! Each path is checked against the cache and, when new or changed, decoded,
//! resized to the target dimensions and written back in place. Paths run on a
//! rayon pool sized to the host. A failure on one path is logged and never
//! affects the others. The cache is saved once at the end, and only if some
//! entry was written during the run.

use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::detector::{detect_change, ChangeStatus};
use super::ProcessError;
use crate::cache::{CacheEntry, CacheStore};
use crate::codec::ImageCodec;
use crate::progress::ProgressCallback;
use crate::scanner::hasher::{content_fingerprint, metadata_fingerprint};

/// Default target width in pixels.
pub const DEFAULT_TARGET_WIDTH: u32 = 426;
/// Default target height in pixels.
pub const DEFAULT_TARGET_HEIGHT: u32 = 240;

/// Configuration for a batch run.
#[derive(Clone)]
pub struct BatchConfig {
    /// Target width in pixels.
    pub target_width: u32,
    /// Target height in pixels.
    pub target_height: u32,
    /// Number of worker threads.
    pub threads: usize,
    /// Re-fingerprint files after re-encoding them.
    pub refresh_after_encode: bool,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchConfig")
            .field("target_width", &self.target_width)
            .field("target_height", &self.target_height)
            .field("threads", &self.threads)
            .field("refresh_after_encode", &self.refresh_after_encode)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            threads: default_threads(),
            refresh_after_encode: true,
            progress_callback: None,
        }
    }
}

impl BatchConfig {
    /// Set the target dimensions (each at least 1 pixel).
    #[must_use]
    pub fn with_target(mut self, width: u32, height: u32) -> Self {
        self.target_width = width.max(1);
        self.target_height = height.max(1);
        self
    }

    /// Set the worker thread count (at least 1).
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Enable or disable re-fingerprinting after an encode.
    #[must_use]
    pub fn with_refresh_after_encode(mut self, refresh: bool) -> Self {
        self.refresh_after_encode = refresh;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Number of logical processors, or 1 if unknown.
#[must_use]
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// What happened to a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOutcome {
    /// No transform needed (unchanged, touched or missing).
    Skipped(ChangeStatus),
    /// Decoded, but already at the target dimensions.
    AlreadySized,
    /// Resized and re-encoded in place.
    Resized,
    /// An error occurred; details were logged.
    Failed,
}

/// Totals for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Paths in the input list.
    pub total: usize,
    /// Paths whose cached fingerprints showed no content change.
    pub unchanged: usize,
    /// Paths that did not exist.
    pub missing: usize,
    /// Paths decoded but already at the target size.
    pub already_sized: usize,
    /// Paths resized and re-encoded.
    pub resized: usize,
    /// Paths that failed.
    pub failed: usize,
    /// Whether the cache document was written at the end of the run.
    pub cache_saved: bool,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
}

impl BatchSummary {
    fn record(&mut self, outcome: PathOutcome) {
        match outcome {
            PathOutcome::Skipped(ChangeStatus::Missing) => self.missing += 1,
            PathOutcome::Skipped(_) => self.unchanged += 1,
            PathOutcome::AlreadySized => self.already_sized += 1,
            PathOutcome::Resized => self.resized += 1,
            PathOutcome::Failed => self.failed += 1,
        }
    }

    /// Returns true if at least one path failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Runs the change-detect / resize pipeline over a list of paths.
pub struct BatchProcessor<C: ImageCodec> {
    codec: C,
    config: BatchConfig,
}

impl<C: ImageCodec> BatchProcessor<C> {
    /// Create a processor around an image codec.
    #[must_use]
    pub fn new(codec: C, config: BatchConfig) -> Self {
        Self { codec, config }
    }

    /// Get the codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Get the configuration.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Process every path and flush the cache once if any entry changed.
    ///
    /// Blocks until all paths are done. Per-path errors are logged and
    /// counted in the summary, never returned. Duplicate paths are processed
    /// independently.
    pub fn process_batch(&self, store: &CacheStore, paths: &[PathBuf]) -> BatchSummary {
        log::info!(
            "Processing {} thumbnail(s) on {} worker(s)...",
            paths.len(),
            self.config.threads
        );
        let start = Instant::now();
        let dirty = AtomicBool::new(false);

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_batch_start(paths.len());
        }

        let outcomes = self.run_workers(store, paths, &dirty);

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_batch_end();
        }

        let mut summary = BatchSummary {
            total: paths.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            summary.record(outcome);
        }

        if dirty.load(Ordering::Acquire) {
            summary.cache_saved = store.save();
        }

        summary.elapsed = start.elapsed();
        log::info!(
            "Processed {} thumbnail(s) in {}ms ({} resized, {} already sized, {} unchanged, {} missing, {} failed)",
            summary.total,
            summary.elapsed.as_millis(),
            summary.resized,
            summary.already_sized,
            summary.unchanged,
            summary.missing,
            summary.failed
        );

        summary
    }

    fn run_workers(
        &self,
        store: &CacheStore,
        paths: &[PathBuf],
        dirty: &AtomicBool,
    ) -> Vec<PathOutcome> {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
        {
            Ok(pool) => pool.install(|| self.run_parallel(store, paths, dirty)),
            Err(e) => {
                log::warn!(
                    "Failed to create thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                self.run_parallel(store, paths, dirty)
            }
        }
    }

    fn run_parallel(
        &self,
        store: &CacheStore,
        paths: &[PathBuf],
        dirty: &AtomicBool,
    ) -> Vec<PathOutcome> {
        paths
            .par_iter()
            .map(|path| {
                let outcome = self.process_path(store, path, dirty);
                if let Some(ref callback) = self.config.progress_callback {
                    callback.on_item_done(path);
                }
                outcome
            })
            .collect()
    }

    fn process_path(&self, store: &CacheStore, path: &Path, dirty: &AtomicBool) -> PathOutcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.try_process_path(store, path, dirty)
        }));

        match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                log::error!("Error processing {}: {}", path.display(), e);
                PathOutcome::Failed
            }
            Err(_) => {
                log::error!("Panic while processing {}", path.display());
                PathOutcome::Failed
            }
        }
    }

    fn try_process_path(
        &self,
        store: &CacheStore,
        path: &Path,
        dirty: &AtomicBool,
    ) -> Result<PathOutcome, ProcessError> {
        let status = detect_change(store, path)?;
        if status.dirtied_cache() {
            dirty.store(true, Ordering::Release);
        }

        if !status.needs_processing() {
            log::debug!("Skipping {:?}: {}", status, path.display());
            return Ok(PathOutcome::Skipped(status));
        }

        let (width, height) = (self.config.target_width, self.config.target_height);
        let image = self.codec.decode(path)?;

        if self.codec.dimensions(&image) == (width, height) {
            log::debug!("Already preferred size: {}", path.display());
            return Ok(PathOutcome::AlreadySized);
        }

        let resized = self.codec.resize(&image, width, height);
        drop(image);
        self.codec.encode(&resized, path)?;
        log::debug!("Saved resized image: {}", path.display());

        if self.config.refresh_after_encode {
            refresh_entry(store, path);
        }

        Ok(PathOutcome::Resized)
    }
}

/// Record the post-encode fingerprints so the next run takes the fast path.
///
/// On failure the pre-encode entry stays; the next run then sees a content
/// change and finds the image already sized.
fn refresh_entry(store: &CacheStore, path: &Path) {
    let fingerprints = metadata_fingerprint(path)
        .and_then(|meta| content_fingerprint(path).map(|content| (meta, content)));

    match fingerprints {
        Ok((meta_hash, content_hash)) => {
            store.set(path, CacheEntry::new(meta_hash, content_hash));
        }
        Err(e) => log::warn!("Could not refresh fingerprint after encode: {}", e),
    }
}
