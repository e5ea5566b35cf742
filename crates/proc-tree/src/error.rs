use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Result type for procfs reads.
pub type Result<T> = StdResult<T, Error>;

/// Errors from reading `/proc` entries.
#[derive(Debug, Error)]
pub enum Error {
    /// The entry could not be read (process gone, permission denied, ...).
    #[error("io error at {path}: {source}")]
    Io {
        /// The entry being read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The entry was readable but not in the expected shape.
    #[error("malformed {what} in {path}")]
    Malformed {
        /// The entry being parsed.
        path: PathBuf,
        /// Which field failed to parse.
        what: &'static str,
    },
}
