#![warn(missing_docs)]
//! tmux pane navigation.
//!
//! tmux is driven entirely through its command-line client: every query and
//! every pane selection is one `tmux -S <socket> ...` subprocess. The socket
//! is discovered from the attached client's command line in `/proc`.

mod client;
mod cmd;
mod error;
mod hook;
mod socket;

pub use client::{ClientTarget, TmuxClient, parse_client, parse_edges};
pub use cmd::{MAX_OUTPUT, Tmux};
pub use error::{Error, Result};
pub use hook::TmuxHook;
pub use socket::{SocketArg, tmpdir_from_env};
