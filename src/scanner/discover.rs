//! Thumbnail discovery below mod directories.
//!
//! Every immediate child directory of a mod root is a mod; its thumbnail is
//! the file named [`DiscoveryConfig::thumbnail_name`] inside it. Workshop
//! roots are always searched. Local roots are searched only when
//! [`DiscoveryConfig::include_local`] is set, since local mods are often
//! under active development and their thumbnails should stay untouched.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Default thumbnail file name inside a mod directory.
pub const DEFAULT_THUMBNAIL_NAME: &str = "thumbnail.png";

/// Configuration for thumbnail discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Roots whose mods are always included.
    pub workshop_roots: Vec<PathBuf>,
    /// Roots whose mods are included only when `include_local` is set.
    pub local_roots: Vec<PathBuf>,
    /// File name looked up in each mod directory.
    pub thumbnail_name: String,
    /// Include thumbnails found under `local_roots`.
    pub include_local: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            workshop_roots: Vec::new(),
            local_roots: Vec::new(),
            thumbnail_name: DEFAULT_THUMBNAIL_NAME.to_string(),
            include_local: false,
        }
    }
}

/// Collect thumbnail paths for every mod under the configured roots.
///
/// Results are ordered root by root, mods sorted by directory name.
/// Unreadable roots or entries are logged and skipped.
#[must_use]
pub fn discover_thumbnails(config: &DiscoveryConfig) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for root in &config.workshop_roots {
        collect_from_root(root, &config.thumbnail_name, &mut found);
    }

    if config.include_local {
        for root in &config.local_roots {
            collect_from_root(root, &config.thumbnail_name, &mut found);
        }
    } else if !config.local_roots.is_empty() {
        log::debug!(
            "Skipping {} local mod root(s); local thumbnail resizing is disabled",
            config.local_roots.len()
        );
    }

    log::debug!("Discovered {} thumbnail(s)", found.len());
    found
}

fn collect_from_root(root: &Path, thumbnail_name: &str, found: &mut Vec<PathBuf>) {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Cannot read mod directory under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let candidate = entry.path().join(thumbnail_name);
        if candidate.is_file() {
            log::trace!("Found thumbnail: {}", candidate.display());
            found.push(candidate);
        }
    }
}
