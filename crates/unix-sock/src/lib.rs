#![warn(missing_docs)]
//! Blocking Unix-domain socket primitives.
//!
//! Every IPC call panehop makes is synchronous and bounded: a connection gets a
//! send and a receive timeout once, at connect time, and every transfer loops
//! over short reads and writes until the full amount has moved. End of stream
//! in the middle of a transfer is an error, never a short success.

use std::{
    io::{ErrorKind, Read, Write},
    mem,
    os::unix::{ffi::OsStrExt, net::UnixStream},
    path::Path,
    time::Duration,
};

use tracing::trace;

mod error;

pub use error::{Error, Result};

/// Chunk size used when accumulating an unknown-length reply.
const READ_CHUNK: usize = 4096;

/// Verdict returned by the frame check passed to [`read_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// The buffer holds everything the caller needs.
    Complete,
    /// More bytes are required.
    Incomplete,
}

/// Longest path that fits in `sockaddr_un.sun_path`, leaving room for the NUL.
pub fn max_path_len() -> usize {
    // SAFETY: `sockaddr_un` is plain old data; an all-zero value is valid.
    let addr: libc::sockaddr_un = unsafe { mem::zeroed() };
    addr.sun_path.len() - 1
}

/// Connect to `path` and apply `timeout` to both socket directions.
pub fn connect(path: &Path, timeout: Duration) -> Result<UnixStream> {
    let len = path.as_os_str().as_bytes().len();
    let max = max_path_len();
    if len > max {
        return Err(Error::PathTooLong {
            path: path.to_path_buf(),
            len,
            max,
        });
    }
    let stream = UnixStream::connect(path).map_err(|source| Error::Connect {
        path: path.to_path_buf(),
        source,
    })?;
    // A zero duration is rejected by the OS; treat it as "no timeout".
    let timeout = (!timeout.is_zero()).then_some(timeout);
    stream.set_read_timeout(timeout)?;
    stream.set_write_timeout(timeout)?;
    trace!(path = %path.display(), ?timeout, "socket connected");
    Ok(stream)
}

/// Write all of `buf`, continuing across partial writes.
pub fn write_full<W: Write>(w: &mut W, buf: &[u8]) -> Result<()> {
    let mut sent = 0;
    while sent < buf.len() {
        match w.write(&buf[sent..]) {
            Ok(0) => return Err(Error::Closed(sent)),
            Ok(n) => sent += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    w.flush()?;
    Ok(())
}

/// Fill `buf` completely, continuing across partial reads.
pub fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut got = 0;
    while got < buf.len() {
        match r.read(&mut buf[got..]) {
            Ok(0) => return Err(Error::Closed(got)),
            Ok(n) => got += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Read and discard exactly `len` bytes.
pub fn drain<R: Read>(r: &mut R, len: usize) -> Result<()> {
    let mut scratch = [0u8; READ_CHUNK];
    let mut left = len;
    while left > 0 {
        let n = left.min(scratch.len());
        read_full(r, &mut scratch[..n])?;
        left -= n;
    }
    Ok(())
}

/// Accumulate bytes until `check` reports a complete frame.
///
/// `check` sees the whole buffer after every read. Reading stops with an
/// error when the peer closes the stream or when `budget` bytes have been
/// collected without `check` accepting them.
pub fn read_until<R, F>(r: &mut R, budget: usize, mut check: F) -> Result<Vec<u8>>
where
    R: Read,
    F: FnMut(&[u8]) -> Frame,
{
    let mut buf = Vec::with_capacity(budget.min(READ_CHUNK));
    let mut chunk = [0u8; READ_CHUNK];
    while buf.len() < budget {
        let want = (budget - buf.len()).min(chunk.len());
        match r.read(&mut chunk[..want]) {
            Ok(0) => return Err(Error::Closed(buf.len())),
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if check(&buf) == Frame::Complete {
                    return Ok(buf);
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Err(Error::BudgetExhausted(budget))
}
