#![warn(missing_docs)]

//! Shared logging helpers and CLI argument definitions for the panehop workspace.
//!
//! The filter is decided once at startup into a [`LogConfig`] and handed to
//! [`init`]; nothing reads the environment after that.

use std::{env, io};

use clap::Args;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

/// Environment toggle for debug output. Any non-empty value other than `0`
/// turns on crate-scoped `debug`.
pub const DEBUG_ENV: &str = "PANEHOP_DEBUG";

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "panehop_engine=trace,tmux_nav=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &[
        "panehop",
        "panehop_engine",
        "nvim_rpc",
        "sway_ipc",
        "tmux_nav",
        "proc_tree",
        "unix_sock",
        "logging",
    ]
}

/// Build a filter directive string that sets the same `level` for all of our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{t}={lvl}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Is the debug toggle set?
fn debug_toggle(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty() && v != "0")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - [`DEBUG_ENV`] (crate-scoped `debug`)
/// - `RUST_LOG` env
/// - default to crate-scoped `warn`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
) -> String {
    let debug_env = env::var(DEBUG_ENV).ok();
    let rust_log = env::var("RUST_LOG").ok();
    spec_from(
        trace,
        debug,
        log_level,
        log_filter,
        debug_env.as_deref(),
        rust_log.as_deref(),
    )
}

/// [`compute_spec`] with the environment supplied by the caller.
pub fn spec_from(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
    debug_env: Option<&str>,
    rust_log: Option<&str>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug || (log_level.is_none() && debug_toggle(debug_env)) {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    match rust_log {
        Some(spec) if !spec.is_empty() => spec.to_string(),
        _ => level_spec_for("warn"),
    }
}

/// Create an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

/// The logging decision for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive string.
    pub spec: String,
}

impl LogConfig {
    /// Resolve flags and environment once.
    pub fn from_args(args: &LogArgs) -> Self {
        Self {
            spec: compute_spec(
                args.trace,
                args.debug,
                args.log_level.as_deref(),
                args.log_filter.as_deref(),
            ),
        }
    }
}

/// Install the global subscriber: compact lines on stderr, no timestamps.
///
/// A second call is a no-op.
pub fn init(config: &LogConfig) {
    registry()
        .with(env_filter_from_spec(&config.spec))
        .with(fmt::layer().with_writer(io::stderr).without_time())
        .try_init()
        .ok();
}
