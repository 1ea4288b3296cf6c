//! Command-line interface definitions for thumbfit.
//!
//! # Example
//!
//! ```bash
//! # Resize explicit files
//! thumbfit resize mods/a/thumbnail.png mods/b/thumbnail.png
//!
//! # Resize every workshop mod thumbnail, plus local mods
//! thumbfit scan ~/game/workshop --local ~/game/mods --resize-local
//!
//! # Inspect the fingerprint cache
//! thumbfit cache info
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Incremental thumbnail resizer with a durable fingerprint cache.
///
/// Only thumbnails that are new or whose content changed since the last run
/// are decoded and resized.
#[derive(Debug, Parser)]
#[command(name = "thumbfit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resize the given image files
    Resize(ResizeArgs),
    /// Find mod thumbnails under mod directories and resize them
    Scan(ScanArgs),
    /// Inspect or clear the fingerprint cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

/// Options shared by every command that runs a batch.
#[derive(Debug, Clone, Default, Args)]
pub struct BatchArgs {
    /// Target width in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Target height in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Fingerprint cache file
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Number of worker threads (default: logical processors)
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub threads: Option<usize>,

    /// Do not re-fingerprint images after re-encoding them
    #[arg(long)]
    pub no_refresh: bool,
}

/// Arguments for `resize`.
#[derive(Debug, Args)]
pub struct ResizeArgs {
    /// Image files to process
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub batch: BatchArgs,
}

/// Arguments for `scan`.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Workshop mod directories (each child directory is one mod)
    #[arg(required = true, value_name = "MOD_DIRS")]
    pub mod_dirs: Vec<PathBuf>,

    /// Local mod directories, included only with --resize-local
    #[arg(long = "local", value_name = "DIR")]
    pub local_dirs: Vec<PathBuf>,

    /// Also resize thumbnails of local mods
    #[arg(long)]
    pub resize_local: bool,

    /// Thumbnail file name inside each mod directory
    #[arg(long, value_name = "NAME")]
    pub thumbnail_name: Option<String>,

    #[command(flatten)]
    pub batch: BatchArgs,
}

/// `cache` subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Show the cache location and entry count
    Info(CacheArgs),
    /// Delete the cache file
    Clear(CacheArgs),
}

/// Arguments for `cache` subcommands.
#[derive(Debug, Args)]
pub struct CacheArgs {
    /// Fingerprint cache file
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,
}
