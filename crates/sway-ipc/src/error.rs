use std::result::Result as StdResult;

use thiserror::Error;

/// Result type for window-manager IPC.
pub type Result<T> = StdResult<T, Error>;

/// Errors raised while talking to the window manager.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure on the IPC socket.
    #[error(transparent)]
    Socket(#[from] unix_sock::Error),

    /// The reply header does not start with the IPC magic.
    #[error("bad reply magic: {0:?}")]
    BadMagic([u8; 6]),

    /// The reply answers a different message type than the one sent.
    #[error("expected reply type {expected}, got {got}")]
    UnexpectedType {
        /// Type code we sent.
        expected: u32,
        /// Type code in the reply header.
        got: u32,
    },

    /// The announced payload is larger than we are willing to read.
    #[error("reply payload of {0} bytes is too large")]
    PayloadTooLarge(u32),

    /// Neither `SWAYSOCK` nor `I3SOCK` is set.
    #[error("SWAYSOCK is not set")]
    MissingSocketEnv,

    /// The tree document could not be parsed.
    #[error("invalid tree json: {0}")]
    Json(#[from] serde_json::Error),
}
