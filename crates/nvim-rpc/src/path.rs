//! Where Neovim puts its default listen socket.

use std::{
    env,
    path::{Path, PathBuf},
};

/// Environment inputs for locating a Neovim socket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocketEnv {
    /// `$XDG_RUNTIME_DIR`.
    pub runtime_dir: Option<PathBuf>,
    /// `$TMPDIR`.
    pub tmp_dir: Option<PathBuf>,
    /// `$USER`.
    pub user: Option<String>,
}

impl SocketEnv {
    /// Read the relevant variables from the process environment. Empty values
    /// count as unset.
    pub fn from_env() -> Self {
        let var = |k: &str| env::var_os(k).filter(|v| !v.is_empty());
        Self {
            runtime_dir: var("XDG_RUNTIME_DIR").map(PathBuf::from),
            tmp_dir: var("TMPDIR").map(PathBuf::from),
            user: var("USER").map(|v| v.to_string_lossy().into_owned()),
        }
    }

    /// Default server socket for the instance with `pid`.
    ///
    /// `$XDG_RUNTIME_DIR/nvim.<pid>.0`, or `<tmp>/nvim.<user>/nvim.<pid>.0`
    /// when no runtime directory is set.
    pub fn socket_path(&self, pid: u32) -> PathBuf {
        let name = format!("nvim.{pid}.0");
        match &self.runtime_dir {
            Some(dir) => dir.join(name),
            None => {
                let tmp = self.tmp_dir.as_deref().unwrap_or(Path::new("/tmp"));
                let user = self.user.as_deref().unwrap_or("unknown");
                tmp.join(format!("nvim.{user}")).join(name)
            }
        }
    }
}
