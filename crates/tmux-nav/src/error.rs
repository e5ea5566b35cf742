use std::{io, process::ExitStatus, result::Result as StdResult, time::Duration};

use thiserror::Error;

/// Result type for tmux operations.
pub type Result<T> = StdResult<T, Error>;

/// Errors from driving tmux.
#[derive(Debug, Error)]
pub enum Error {
    /// The tmux binary could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program we tried to run.
        program: String,
        /// Underlying error.
        source: io::Error,
    },

    /// tmux exited unsuccessfully.
    #[error("tmux {args} failed: {status}")]
    Exit {
        /// Subcommand and arguments, space-joined.
        args: String,
        /// Exit status.
        status: ExitStatus,
    },

    /// tmux did not finish in time and was killed.
    #[error("tmux did not finish within {0:?}")]
    Timeout(Duration),

    /// tmux printed nothing.
    #[error("tmux produced no output")]
    EmptyOutput,

    /// tmux printed more than we accept.
    #[error("tmux output exceeds {0} bytes")]
    OutputTooLarge(usize),

    /// The client pid is not attached to the server.
    #[error("no tmux client with pid {0}")]
    NoClient(u32),

    /// tmux answered, but not in the shape we asked for.
    #[error("unexpected tmux output: {0:?}")]
    Malformed(String),

    /// Reading the client process failed.
    #[error(transparent)]
    Proc(#[from] proc_tree::Error),

    /// Waiting on or reading from the child failed.
    #[error("tmux child I/O: {0}")]
    Io(#[from] io::Error),
}
