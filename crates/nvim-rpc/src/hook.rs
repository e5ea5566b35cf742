use std::{path::Path, time::Duration};

use panehop_engine::{Direction, Hook, MoveResult, ProcInfo};
use tracing::debug;

use crate::{NvimClient, Result, SocketEnv};

/// Step count large enough to reach any split boundary; Neovim clamps it.
const EDGE_COUNT: u32 = 999;

/// Program name matched against argv[0] and the executable.
const PROGRAM: &str = "nvim";

/// Split navigation inside Neovim.
#[derive(Debug, Clone)]
pub struct NvimHook {
    /// Socket-path inputs captured at startup.
    env: SocketEnv,
}

impl NvimHook {
    /// Hook using `env` to locate instance sockets.
    pub fn new(env: SocketEnv) -> Self {
        Self { env }
    }

    /// Connect to the instance with `pid`.
    fn client(&self, pid: u32, timeout: Duration) -> Result<NvimClient> {
        NvimClient::connect(&self.env.socket_path(pid), timeout)
    }

    /// Window number now, and after a `wincmd` towards `dir`.
    fn winnrs(&self, pid: u32, dir: Direction, timeout: Duration) -> Result<(u64, u64)> {
        let mut nvim = self.client(pid, timeout)?;
        let cur = nvim.eval("winnr()")?;
        let next = nvim.eval(&format!("winnr('{}')", dir.nav_key()))?;
        Ok((cur, next))
    }

    /// Run `wincmd` with a count in `dir`.
    fn wincmd(&self, pid: u32, count: u32, dir: Direction, timeout: Duration) -> MoveResult {
        let res = self
            .client(pid, timeout)
            .and_then(|mut nvim| nvim.command(&format!("{count}wincmd {}", dir.nav_key())));
        match res {
            Ok(()) => MoveResult::CanMove,
            Err(e) => {
                debug!(pid, %dir, error = %e, "nvim wincmd failed");
                MoveResult::Error
            }
        }
    }
}

/// True when `path`'s final component is exactly the program name.
fn is_nvim(path: &str) -> bool {
    Path::new(path).file_name().is_some_and(|n| n == PROGRAM)
}

impl Hook for NvimHook {
    fn name(&self) -> &'static str {
        "nvim"
    }

    /// Recent Neovim runs its UI and its server as two processes; the server
    /// (`nvim --embed`) owns the socket. A UI process only matches when its
    /// own socket exists, which is the single-process layout.
    fn detect(&self, proc: &ProcInfo) -> Option<u32> {
        let named = is_nvim(&proc.argv0)
            || proc
                .exe
                .as_deref()
                .and_then(Path::to_str)
                .is_some_and(is_nvim);
        if !named {
            return None;
        }
        if proc.argv1.as_deref() == Some("--embed") || self.env.socket_path(proc.pid).exists() {
            Some(proc.pid)
        } else {
            None
        }
    }

    fn can_move(&self, pid: u32, dir: Direction, timeout: Duration) -> MoveResult {
        match self.winnrs(pid, dir, timeout) {
            Ok((cur, next)) if cur != next => MoveResult::CanMove,
            Ok(_) => MoveResult::AtEdge,
            Err(e) => {
                debug!(pid, %dir, error = %e, "nvim query failed");
                MoveResult::Error
            }
        }
    }

    fn move_focus(&self, pid: u32, dir: Direction, timeout: Duration) -> MoveResult {
        self.wincmd(pid, 1, dir, timeout)
    }

    fn move_to_edge(&self, pid: u32, dir: Direction, timeout: Duration) -> MoveResult {
        self.wincmd(pid, EDGE_COUNT, dir, timeout)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use super::*;

    fn info(pid: u32, argv0: &str, argv1: Option<&str>, exe: Option<&str>) -> ProcInfo {
        ProcInfo {
            pid,
            argv0: argv0.into(),
            argv1: argv1.map(Into::into),
            exe: exe.map(PathBuf::from),
        }
    }

    fn hook_in(dir: &Path) -> NvimHook {
        NvimHook::new(SocketEnv {
            runtime_dir: Some(dir.to_path_buf()),
            ..SocketEnv::default()
        })
    }

    #[test]
    fn detects_embedded_server() {
        let dir = tempfile::tempdir().unwrap();
        let hook = hook_in(dir.path());
        assert_eq!(hook.detect(&info(5, "nvim", Some("--embed"), None)), Some(5));
        assert_eq!(
            hook.detect(&info(6, "/usr/bin/nvim", Some("--embed"), None)),
            Some(6)
        );
    }

    #[test]
    fn ui_process_needs_its_own_socket() {
        let dir = tempfile::tempdir().unwrap();
        let hook = hook_in(dir.path());
        assert_eq!(hook.detect(&info(8, "nvim", Some("notes.md"), None)), None);
        fs::write(dir.path().join("nvim.8.0"), b"").unwrap();
        assert_eq!(hook.detect(&info(8, "nvim", Some("notes.md"), None)), Some(8));
    }

    #[test]
    fn matches_on_exe_when_argv0_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let hook = hook_in(dir.path());
        assert_eq!(
            hook.detect(&info(9, "editor", Some("--embed"), Some("/opt/nvim/bin/nvim"))),
            Some(9)
        );
    }

    #[test]
    fn ignores_lookalikes() {
        let dir = tempfile::tempdir().unwrap();
        let hook = hook_in(dir.path());
        assert_eq!(hook.detect(&info(1, "vim", Some("--embed"), None)), None);
        assert_eq!(hook.detect(&info(2, "nvim-qt", Some("--embed"), None)), None);
    }

    #[test]
    fn unreachable_instance_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let hook = hook_in(dir.path());
        let t = Duration::from_millis(20);
        assert_eq!(hook.can_move(4242, Direction::Left, t), MoveResult::Error);
        assert_eq!(hook.move_focus(4242, Direction::Left, t), MoveResult::Error);
        assert_eq!(hook.move_to_edge(4242, Direction::Left, t), MoveResult::Error);
    }
}
