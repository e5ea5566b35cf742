//! The fixed table of hooks panehop knows about.

use std::{path::PathBuf, time::Duration};

use nvim_rpc::{NvimHook, SocketEnv};
use panehop_engine::Hook;
use proc_tree::Procfs;
use tmux_nav::TmuxHook;

use crate::{Error, Result};

/// Every hook, in detection priority order.
pub struct Registry {
    /// Registered hooks. The first hook to match a process claims it.
    hooks: Vec<Box<dyn Hook>>,
}

impl Registry {
    /// The built-in hooks: Neovim, then tmux.
    pub fn builtin(
        procfs: Procfs,
        nvim_env: SocketEnv,
        tmux_tmpdir: PathBuf,
        timeout: Duration,
    ) -> Self {
        Self {
            hooks: vec![
                Box::new(NvimHook::new(nvim_env)),
                Box::new(TmuxHook::new(procfs, tmux_tmpdir, timeout)),
            ],
        }
    }

    /// Registered names, comma-separated.
    pub fn names(&self) -> String {
        self.hooks
            .iter()
            .map(|h| h.name())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Exact-name lookup.
    pub fn find_hook_by_name(&self, name: &str) -> Option<&dyn Hook> {
        self.hooks
            .iter()
            .find(|h| h.name() == name)
            .map(|h| h.as_ref())
    }

    /// Hooks to run, in registry order. `None` enables everything; a name that
    /// is not registered is an error.
    pub fn enabled(&self, names: Option<&[String]>) -> Result<Vec<&dyn Hook>> {
        let Some(names) = names else {
            return Ok(self.hooks.iter().map(|h| h.as_ref()).collect());
        };
        for name in names {
            if self.find_hook_by_name(name).is_none() {
                return Err(Error::UnknownHook {
                    name: name.clone(),
                    available: self.names(),
                });
            }
        }
        Ok(self
            .hooks
            .iter()
            .filter(|h| names.iter().any(|n| n == h.name()))
            .map(|h| h.as_ref())
            .collect())
    }
}
