//! Application configuration management.
//!
//! Settings are layered with figment, later sources winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. TOML config file (`--config`, else the platform config directory)
//! 3. `THUMBFIT_*` environment variables
//! 4. CLI flags ([`Config::with_overrides`])

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_CACHE_FILE;
use crate::cli::BatchArgs;
use crate::pipeline::{default_threads, BatchConfig, DEFAULT_TARGET_HEIGHT, DEFAULT_TARGET_WIDTH};
use crate::scanner::{DiscoveryConfig, DEFAULT_THUMBNAIL_NAME};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "THUMBFIT_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Master switch; when false no batch is run.
    pub enabled: bool,
    /// Target thumbnail width in pixels.
    pub target_width: u32,
    /// Target thumbnail height in pixels.
    pub target_height: u32,
    /// Cache document location. Relative paths resolve against the working directory.
    pub cache_file: PathBuf,
    /// Worker threads; `None` uses every logical processor.
    pub threads: Option<usize>,
    /// File name looked up inside each mod directory.
    pub thumbnail_name: String,
    /// Include local (non-workshop) mods when scanning.
    pub resize_local_thumbnails: bool,
    /// Re-fingerprint images after re-encoding them.
    pub refresh_after_encode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            threads: None,
            thumbnail_name: DEFAULT_THUMBNAIL_NAME.to_string(),
            resize_local_thumbnails: false,
            refresh_after_encode: true,
        }
    }
}

impl Config {
    /// Build the provider stack without extracting it.
    ///
    /// A missing default config file is ignored.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = config_file
            .map(Path::to_path_buf)
            .or_else(Self::default_config_path)
        {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate the configuration.
    ///
    /// An explicitly given config file must exist.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_file {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
        }

        let config: Config = Self::figment(config_file)
            .extract()
            .context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Default platform-specific config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "thumbfit", "thumbfit")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Reject settings the batch cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.target_width == 0 || self.target_height == 0 {
            anyhow::bail!(
                "Target dimensions must be positive, got {}x{}",
                self.target_width,
                self.target_height
            );
        }
        if self.threads == Some(0) {
            anyhow::bail!("threads must be at least 1");
        }
        if self.thumbnail_name.is_empty() {
            anyhow::bail!("thumbnail_name must not be empty");
        }
        Ok(())
    }

    /// Apply CLI flags on top of the loaded configuration.
    #[must_use]
    pub fn with_overrides(mut self, args: &BatchArgs) -> Self {
        if let Some(width) = args.width {
            self.target_width = width;
        }
        if let Some(height) = args.height {
            self.target_height = height;
        }
        if let Some(ref cache) = args.cache {
            self.cache_file = cache.clone();
        }
        if let Some(threads) = args.threads {
            self.threads = Some(threads);
        }
        if args.no_refresh {
            self.refresh_after_encode = false;
        }
        self
    }

    /// Effective worker thread count.
    #[must_use]
    pub fn worker_threads(&self) -> usize {
        self.threads.unwrap_or_else(default_threads)
    }

    /// Batch settings derived from this configuration.
    #[must_use]
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig::default()
            .with_target(self.target_width, self.target_height)
            .with_threads(self.worker_threads())
            .with_refresh_after_encode(self.refresh_after_encode)
    }

    /// Discovery settings for the given mod roots.
    #[must_use]
    pub fn discovery_config(
        &self,
        workshop_roots: Vec<PathBuf>,
        local_roots: Vec<PathBuf>,
    ) -> DiscoveryConfig {
        DiscoveryConfig {
            workshop_roots,
            local_roots,
            thumbnail_name: self.thumbnail_name.clone(),
            include_local: self.resize_local_thumbnails,
        }
    }
}
