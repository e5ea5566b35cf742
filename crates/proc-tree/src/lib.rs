#![warn(missing_docs)]
//! Read-only access to Linux `/proc` for process-tree walking.
//!
//! All reads are best effort: processes come and go while we look at them, so
//! callers are expected to skip any entry that fails to read. The procfs root
//! is configurable so tests can point at a fabricated tree.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use tracing::trace;

mod error;

pub use error::{Error, Result};

/// Default procfs mount point.
pub const PROC_ROOT: &str = "/proc";

/// What detectors get to see about a single process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcInfo {
    /// Process id.
    pub pid: u32,
    /// First argument vector entry (empty for kernel threads).
    pub argv0: String,
    /// Second argument vector entry, if any.
    pub argv1: Option<String>,
    /// Resolved `/proc/<pid>/exe` target. `None` when unreadable.
    pub exe: Option<PathBuf>,
}

/// Handle on a procfs mount.
#[derive(Debug, Clone)]
pub struct Procfs {
    /// Mount point, normally `/proc`.
    root: PathBuf,
}

impl Default for Procfs {
    fn default() -> Self {
        Self::new()
    }
}

impl Procfs {
    /// Procfs at the standard mount point.
    pub fn new() -> Self {
        Self::with_root(PROC_ROOT)
    }

    /// Procfs rooted somewhere else.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The mount point.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a single process.
    fn pid_dir(&self, pid: u32) -> PathBuf {
        self.root.join(pid.to_string())
    }

    /// Direct children of `pid`, gathered from every thread's `children` file.
    ///
    /// A child forked from a non-leader thread only shows up in that thread's
    /// listing, so all tasks are consulted. Unreadable tasks are skipped.
    pub fn children(&self, pid: u32) -> Result<Vec<u32>> {
        let task_dir = self.pid_dir(pid).join("task");
        let entries = fs::read_dir(&task_dir).map_err(|source| Error::Io {
            path: task_dir.clone(),
            source,
        })?;
        let mut out = BTreeSet::new();
        for entry in entries.flatten() {
            let path = entry.path().join("children");
            let Ok(raw) = fs::read_to_string(&path) else {
                trace!(path = %path.display(), "skipping unreadable children list");
                continue;
            };
            out.extend(parse_children(&raw));
        }
        Ok(out.into_iter().collect())
    }

    /// Raw NUL-separated command line.
    pub fn cmdline(&self, pid: u32) -> Result<Vec<u8>> {
        let path = self.pid_dir(pid).join("cmdline");
        fs::read(&path).map_err(|source| Error::Io { path, source })
    }

    /// Command line split into arguments.
    pub fn argv(&self, pid: u32) -> Result<Vec<String>> {
        Ok(split_cmdline(&self.cmdline(pid)?))
    }

    /// Resolved executable path.
    pub fn exe(&self, pid: u32) -> Result<PathBuf> {
        let path = self.pid_dir(pid).join("exe");
        fs::read_link(&path).map_err(|source| Error::Io { path, source })
    }

    /// Real user id from the `Uid:` line of the status file.
    pub fn real_uid(&self, pid: u32) -> Result<u32> {
        let path = self.pid_dir(pid).join("status");
        let raw = fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        parse_real_uid(&raw).ok_or(Error::Malformed { path, what: "Uid" })
    }

    /// Everything a detector needs about `pid`.
    ///
    /// Fails only when the command line cannot be read; an unreadable `exe`
    /// link (common for other users' processes) leaves `exe` empty.
    pub fn process(&self, pid: u32) -> Result<ProcInfo> {
        let mut argv = self.argv(pid)?.into_iter();
        let argv0 = argv.next().unwrap_or_default();
        let argv1 = argv.next();
        Ok(ProcInfo {
            pid,
            argv0,
            argv1,
            exe: self.exe(pid).ok(),
        })
    }
}

/// Parse a whitespace-separated `children` listing, ignoring junk tokens.
pub fn parse_children(raw: &str) -> Vec<u32> {
    raw.split_ascii_whitespace()
        .filter_map(|t| t.parse().ok())
        .collect()
}

/// Split a NUL-separated argument vector. A trailing NUL does not produce an
/// empty final argument.
pub fn split_cmdline(raw: &[u8]) -> Vec<String> {
    let raw = raw.strip_suffix(&[0]).unwrap_or(raw);
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|b| *b == 0)
        .map(|a| String::from_utf8_lossy(a).into_owned())
        .collect()
}

/// Extract the real uid (first field of `Uid:`) from a status file.
pub fn parse_real_uid(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|l| l.strip_prefix("Uid:"))
        .and_then(|rest| rest.split_ascii_whitespace().next())
        .and_then(|v| v.parse().ok())
}
