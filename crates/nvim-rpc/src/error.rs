use std::result::Result as StdResult;

use thiserror::Error;

use crate::codec::{DecodeError, EncodeError};

/// Result type for Neovim RPC calls.
pub type Result<T> = StdResult<T, Error>;

/// Errors from talking to a Neovim instance.
#[derive(Debug, Error)]
pub enum Error {
    /// Connecting, sending or receiving failed.
    #[error(transparent)]
    Socket(#[from] unix_sock::Error),

    /// The request could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// The response was complete but not usable.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}
