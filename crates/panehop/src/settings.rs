//! Run settings resolved once from the command line and environment.

use std::{ffi::OsString, path::PathBuf, time::Duration};

use panehop_engine::Direction;

use crate::{Result, cli::Cli};

/// Everything a single navigation needs to know up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Requested direction.
    pub direction: Direction,
    /// Per-call IPC timeout.
    pub timeout: Duration,
    /// Hooks to enable, or `None` for all of them.
    pub hooks: Option<Vec<String>>,
    /// Window manager socket.
    pub sway_socket: PathBuf,
}

impl Settings {
    /// Combine parsed arguments with environment values from `lookup`.
    pub fn resolve<F>(cli: &Cli, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let hooks = cli.hooks.as_ref().map(|names| {
            names
                .iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect()
        });
        Ok(Self {
            direction: cli.direction,
            timeout: Duration::from_millis(cli.timeout),
            hooks,
            sway_socket: sway_ipc::socket_from(lookup)?,
        })
    }
}
