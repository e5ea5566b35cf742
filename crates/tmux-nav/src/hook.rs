use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

use panehop_engine::{DetectedList, Direction, Hook, MoveResult, ProcInfo, Scanner};
use proc_tree::Procfs;
use tracing::debug;

use crate::{Result, SocketArg, Tmux, TmuxClient};

/// Substring identifying tmux in argv[0] or the executable name.
const PROGRAM: &str = "tmux";

/// Pane navigation inside tmux.
///
/// The detected pid is the tmux *client* running in the terminal window. Its
/// command line tells us which server to talk to; the server's process tree
/// (where pane programs live) is reached through [`Hook::discover_inner`].
#[derive(Debug, Clone)]
pub struct TmuxHook {
    /// Where client command lines and uids are read from.
    procfs: Procfs,
    /// `TMUX_TMPDIR` or `/tmp`.
    tmpdir: PathBuf,
    /// tmux binary.
    program: OsString,
    /// Limit for the tmux calls made during discovery, which has no
    /// per-request timeout of its own.
    discover_timeout: Duration,
}

impl TmuxHook {
    /// Hook reading `/proc` through `procfs`, with per-user socket directories
    /// under `tmpdir`.
    pub fn new(procfs: Procfs, tmpdir: impl Into<PathBuf>, discover_timeout: Duration) -> Self {
        Self {
            procfs,
            tmpdir: tmpdir.into(),
            program: OsString::from(PROGRAM),
            discover_timeout,
        }
    }

    /// Use a different tmux binary.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Server socket of client `pid`.
    pub fn socket_path(&self, pid: u32) -> Result<PathBuf> {
        let arg = SocketArg::parse(&self.procfs.argv(pid)?);
        if !arg.needs_uid() {
            return Ok(arg.resolve(&self.tmpdir, 0));
        }
        let uid = match self.procfs.real_uid(pid) {
            Ok(uid) => uid,
            Err(e) => {
                debug!(pid, error = %e, "client uid unreadable, using our own");
                current_uid()
            }
        };
        Ok(arg.resolve(&self.tmpdir, uid))
    }

    /// Client handle for `pid`.
    fn client(&self, pid: u32, timeout: Duration) -> Result<TmuxClient> {
        let tmux = Tmux::with_program(self.program.clone(), self.socket_path(pid)?, timeout);
        Ok(TmuxClient::new(tmux, pid))
    }

    /// Run `op` against client `pid`, folding failures into [`MoveResult::Error`].
    fn with_client<F>(&self, pid: u32, timeout: Duration, what: &str, op: F) -> MoveResult
    where
        F: FnOnce(&TmuxClient) -> Result<MoveResult>,
    {
        match self.client(pid, timeout).and_then(|c| op(&c)) {
            Ok(res) => res,
            Err(e) => {
                debug!(pid, error = %e, "tmux {what} failed");
                MoveResult::Error
            }
        }
    }
}

/// Real uid of this process.
fn current_uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail.
    unsafe { libc::getuid() }
}

/// Does `s` name tmux?
fn names_tmux(s: &str) -> bool {
    s.contains(PROGRAM)
}

impl Hook for TmuxHook {
    fn name(&self) -> &'static str {
        "tmux"
    }

    fn detect(&self, proc: &ProcInfo) -> Option<u32> {
        let exe_matches = proc
            .exe
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .is_some_and(names_tmux);
        (names_tmux(&proc.argv0) || exe_matches).then_some(proc.pid)
    }

    fn can_move(&self, pid: u32, dir: Direction, timeout: Duration) -> MoveResult {
        self.with_client(pid, timeout, "edge query", |c| {
            Ok(if c.at_edge(dir)? {
                MoveResult::AtEdge
            } else {
                MoveResult::CanMove
            })
        })
    }

    fn move_focus(&self, pid: u32, dir: Direction, timeout: Duration) -> MoveResult {
        self.with_client(pid, timeout, "select-pane", |c| {
            c.select(dir)?;
            Ok(MoveResult::CanMove)
        })
    }

    fn move_to_edge(&self, pid: u32, dir: Direction, timeout: Duration) -> MoveResult {
        self.with_client(pid, timeout, "edge select", |c| {
            c.select_edge(dir)?;
            Ok(MoveResult::CanMove)
        })
    }

    /// Pane programs are children of the tmux server, not of the client in
    /// the window, so the active pane's process is scanned as a separate root.
    fn discover_inner<'h>(
        &self,
        pid: u32,
        scanner: &Scanner<'h>,
        list: &mut DetectedList<'h>,
        depth: u32,
    ) {
        let pane_pid = self
            .client(pid, self.discover_timeout)
            .and_then(|c| c.pane_pid());
        match pane_pid {
            Ok(root) => {
                debug!(client = pid, pane_pid = root, depth, "scanning tmux pane");
                scanner.walk_from(root, list, depth);
            }
            Err(e) => debug!(pid, error = %e, "tmux pane pid lookup failed"),
        }
    }
}
