//! Log setup for the `thumbfit` binary.
//!
//! Records go through the `log` facade to an `env_logger` backend. A
//! `RUST_LOG` filter replaces the CLI flags entirely; otherwise `--quiet`
//! keeps errors only and each `-v` lowers the threshold one step from info.
//!
//! ```rust,no_run
//! use thumbfit::logging::init_logging;
//!
//! // -v: per-path skip and resize decisions become visible
//! init_logging(1, false);
//! log::debug!("Skipping Unchanged: /mods/a/thumbnail.png");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Install the global logger.
///
/// # Panics
///
/// Panics on a second call; `env_logger` installs a process-wide logger.
pub fn init_logging(verbose: u8, quiet: bool) {
    let mut builder = Builder::new();

    let rust_log = std::env::var("RUST_LOG").ok();
    match rust_log {
        Some(ref filters) => {
            builder.parse_filters(filters);
        }
        None => {
            builder.filter_level(determine_level(verbose, quiet));
        }
    }

    let style = LineStyle::for_build(verbose);
    builder.format(move |buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);

        if style.timestamp {
            let now = buf.timestamp_seconds();
            write!(buf, "{now} ")?;
        }
        write!(buf, "{level_style}{level:<5}{level_style:#} ")?;
        if style.module {
            write!(buf, "[{}] ", record.module_path().unwrap_or("unknown"))?;
        }
        writeln!(buf, "{}", record.args())
    });
    builder.init();

    match rust_log {
        Some(filters) => log::debug!("Log filters from RUST_LOG: {filters}"),
        None => log::debug!("Log level: {}", determine_level(verbose, quiet)),
    }
}

/// Level from CLI flags alone. Quiet wins over verbose.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// Optional parts of each log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineStyle {
    timestamp: bool,
    module: bool,
}

impl LineStyle {
    /// Debug builds stamp every line and name the module once verbose;
    /// release builds print level and message only.
    fn for_build(verbose: u8) -> Self {
        Self::new(cfg!(debug_assertions), verbose)
    }

    fn new(debug_build: bool, verbose: u8) -> Self {
        Self {
            timestamp: debug_build,
            module: debug_build && verbose >= 1,
        }
    }
}
