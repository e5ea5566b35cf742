//! Error handling for the panehop binary.

use std::result;

use thiserror::Error;

/// Convenient result type for the binary.
pub type Result<T> = result::Result<T, Error>;

/// Fatal errors. Anything that goes wrong inside a layer is not fatal and
/// never reaches this type.
#[derive(Debug, Error)]
pub enum Error {
    /// `--hooks` named a hook that does not exist.
    #[error("unknown hook {name:?} (available: {available})")]
    UnknownHook {
        /// The name given.
        name: String,
        /// Comma-separated registered names.
        available: String,
    },
    /// The window manager socket could not be found or reached.
    #[error("window manager: {0}")]
    Sway(#[from] sway_ipc::Error),
}
