//! thumbfit - Incremental thumbnail resizer
//!
//! Resizes mod thumbnails to a fixed size, re-encoding only files that are
//! new or changed since the last run. Change detection uses a metadata
//! fingerprint first and falls back to a streamed content fingerprint; both
//! are kept in a JSON cache that survives between runs.

pub mod atomic;
pub mod cache;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod progress;
pub mod scanner;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cache::CacheStore;
use crate::cli::{BatchArgs, CacheCommand, Cli, Commands};
use crate::codec::PngCodec;
use crate::config::Config;
use crate::error::ExitCode;
use crate::pipeline::{BatchProcessor, BatchSummary};
use crate::progress::Progress;
use crate::scanner::discover_thumbnails;

/// Run the command described by `cli`.
///
/// Logging is initialized here, so this must be called at most once per
/// process.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref())?;
    let show_progress = !(cli.quiet || cli.no_progress);

    match cli.command {
        Commands::Resize(args) => {
            let config = config.with_overrides(&args.batch);
            let paths = absolute_paths(&args.files)?;
            Ok(run_batch(&config, &paths, show_progress))
        }
        Commands::Scan(args) => {
            let mut config = config.with_overrides(&args.batch);
            if args.resize_local {
                config.resize_local_thumbnails = true;
            }
            if let Some(name) = args.thumbnail_name {
                config.thumbnail_name = name;
            }
            config.validate()?;

            let discovery = config.discovery_config(
                absolute_paths(&args.mod_dirs)?,
                absolute_paths(&args.local_dirs)?,
            );
            let paths = discover_thumbnails(&discovery);
            Ok(run_batch(&config, &paths, show_progress))
        }
        Commands::Cache(command) => run_cache_command(&config, command),
    }
}

/// Load the cache, run one batch over `paths` and map the outcome to an exit code.
fn run_batch(config: &Config, paths: &[PathBuf], show_progress: bool) -> ExitCode {
    if !config.enabled {
        log::info!("Thumbnail resizing is disabled in the configuration");
        return ExitCode::Success;
    }

    let summary = resize_paths(config, paths, show_progress);
    if summary.has_failures() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    }
}

/// Batch entry point for embedding callers.
///
/// Loads the cache configured in `config`, processes `paths` with the PNG
/// codec and flushes the cache if anything changed.
pub fn resize_paths(config: &Config, paths: &[PathBuf], show_progress: bool) -> BatchSummary {
    let store = CacheStore::load(&config.cache_file);

    let mut batch_config = config.batch_config();
    if show_progress {
        batch_config = batch_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    BatchProcessor::new(PngCodec::new(), batch_config).process_batch(&store, paths)
}

fn run_cache_command(config: &Config, command: CacheCommand) -> Result<ExitCode> {
    match command {
        CacheCommand::Info(args) => {
            let config = config.clone().with_overrides(&cache_overrides(args.cache));
            let store = CacheStore::try_load(&config.cache_file).with_context(|| {
                format!("Failed to read cache {}", config.cache_file.display())
            })?;
            println!("Cache file: {}", config.cache_file.display());
            println!("Entries:    {}", store.len());
        }
        CacheCommand::Clear(args) => {
            let config = config.clone().with_overrides(&cache_overrides(args.cache));
            clear_cache(&config.cache_file)?;
        }
    }
    Ok(ExitCode::Success)
}

fn cache_overrides(cache: Option<PathBuf>) -> BatchArgs {
    BatchArgs {
        cache,
        ..Default::default()
    }
}

/// Delete the cache file. A missing file is not an error.
pub fn clear_cache(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::info!("Removed cache file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No cache file at {}", path.display());
            Ok(())
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to remove cache file {}", path.display()))
        }
    }
}

/// Make every path absolute so cache keys stay stable across working directories.
fn absolute_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    paths
        .iter()
        .map(|p| {
            std::path::absolute(p).with_context(|| format!("Invalid path: {}", p.display()))
        })
        .collect()
}
