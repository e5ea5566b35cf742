use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Result type for socket primitives.
pub type Result<T> = StdResult<T, Error>;

/// Errors raised while talking over a Unix-domain stream socket.
#[derive(Debug, Error)]
pub enum Error {
    /// The socket path does not fit in `sockaddr_un.sun_path`.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        /// Offending path.
        path: PathBuf,
        /// Length of the path in bytes.
        len: usize,
        /// Largest usable length.
        max: usize,
    },

    /// Creating or connecting the socket failed.
    #[error("connect to {path} failed: {source}")]
    Connect {
        /// Socket path.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// A send or receive did not complete before the configured timeout.
    #[error("socket operation timed out")]
    Timeout,

    /// The peer closed the stream before the transfer finished.
    #[error("connection closed by peer after {0} bytes")]
    Closed(usize),

    /// The read budget filled up without the caller accepting a frame.
    #[error("read budget of {0} bytes exhausted")]
    BudgetExhausted(usize),

    /// Any other transport failure.
    #[error("socket I/O error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::Io(err),
        }
    }
}
