//! Command-line interface definitions for panehop.

use clap::Parser;
use logging::LogArgs;
use panehop_engine::Direction;

/// Command-line interface for the `panehop` binary.
#[derive(Parser, Debug)]
#[command(
    name = "panehop",
    about = "Move focus across editor splits, tmux panes and windows",
    version
)]
pub struct Cli {
    /// Direction to move: left, right, up or down.
    #[arg(value_name = "DIRECTION")]
    pub direction: Direction,

    /// Per-call timeout for every IPC request, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 100)]
    pub timeout: u64,

    /// Comma-separated hooks to enable (default: all).
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    pub hooks: Option<Vec<String>>,

    /// Logging controls shared across panehop binaries.
    #[command(flatten)]
    pub log: LogArgs,
}
