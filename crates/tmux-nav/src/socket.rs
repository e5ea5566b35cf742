//! Locate the server socket a tmux client is attached to.
//!
//! The client's own argument vector is the source of truth: `-S path` names
//! the socket outright, `-L name` picks a socket in the per-user directory,
//! and without either the client uses `default`. The per-user directory is
//! keyed by the client's real uid.

use std::{
    env,
    path::{Path, PathBuf},
};

/// Global tmux flags that take a value.
const VALUE_FLAGS: &[char] = &['c', 'f', 'L', 'S', 'T'];

/// Socket selection found on a client command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketArg {
    /// `-S path`: a literal socket path.
    Path(PathBuf),
    /// `-L name`: a named socket in the per-user directory.
    Name(String),
    /// No socket flag.
    Default,
}

impl SocketArg {
    /// Parse the global flags of a tmux command line (argv[0] included).
    ///
    /// Flags follow getopt rules: they may be clustered (`-2uL name`) and a
    /// value may be attached (`-Spath`). `-S` wins over `-L` regardless of
    /// order. Parsing stops at the first non-flag argument, which is the tmux
    /// command.
    pub fn parse<S: AsRef<str>>(argv: &[S]) -> Self {
        let mut name = None;
        let mut args = argv.iter().skip(1).map(AsRef::as_ref);
        while let Some(arg) = args.next() {
            if arg == "--" || arg.len() < 2 || !arg.starts_with('-') {
                break;
            }
            let flags = &arg[1..];
            for (i, flag) in flags.char_indices() {
                if !VALUE_FLAGS.contains(&flag) {
                    continue;
                }
                let attached = &flags[i + flag.len_utf8()..];
                let value = if attached.is_empty() {
                    args.next()
                } else {
                    Some(attached)
                };
                match (flag, value) {
                    ('S', Some(path)) => return Self::Path(PathBuf::from(path)),
                    ('L', Some(n)) => name = Some(n.to_string()),
                    _ => {}
                }
                break;
            }
        }
        name.map_or(Self::Default, Self::Name)
    }

    /// Whether resolving this needs the client's uid.
    pub fn needs_uid(&self) -> bool {
        !matches!(self, Self::Path(_))
    }

    /// Resolve to a socket path.
    pub fn resolve(self, tmpdir: &Path, uid: u32) -> PathBuf {
        match self {
            Self::Path(p) => p,
            Self::Name(n) => user_dir(tmpdir, uid).join(n),
            Self::Default => user_dir(tmpdir, uid).join("default"),
        }
    }
}

/// `<tmpdir>/tmux-<uid>`.
fn user_dir(tmpdir: &Path, uid: u32) -> PathBuf {
    tmpdir.join(format!("tmux-{uid}"))
}

/// Base directory for per-user socket directories: `TMUX_TMPDIR` or `/tmp`.
pub fn tmpdir_from_env() -> PathBuf {
    env::var_os("TMUX_TMPDIR")
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from("/tmp"), PathBuf::from)
}
