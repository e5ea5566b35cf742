use std::{
    env,
    ffi::OsString,
    os::unix::net::UnixStream,
    path::{Path, PathBuf},
    time::Duration,
};

use panehop_engine::{Direction, WindowFocus};
use tracing::{debug, trace};

use crate::{
    Error, Result, tree,
    wire::{self, HEADER_LEN, MsgType},
};

/// Largest reply payload we will read. Layout trees of very busy sessions are
/// still far below this.
const MAX_PAYLOAD: u32 = 64 * 1024 * 1024;

/// Socket path from `SWAYSOCK`, falling back to `I3SOCK`.
pub fn socket_from_env() -> Result<PathBuf> {
    socket_from(|key| env::var_os(key))
}

/// Socket path resolution over an arbitrary variable lookup.
pub fn socket_from<F>(lookup: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    ["SWAYSOCK", "I3SOCK"]
        .into_iter()
        .filter_map(lookup)
        .find(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(Error::MissingSocketEnv)
}

/// A blocking connection to the window manager's IPC socket.
///
/// A request that fails part-way leaves the stream at an unknown position,
/// so the connection is dropped and the next request opens a fresh one.
pub struct SwayClient {
    /// Socket path, kept for reconnecting.
    path: PathBuf,
    /// Send and receive timeout.
    timeout: Duration,
    /// Live connection; `None` after a failed exchange.
    stream: Option<UnixStream>,
}

impl SwayClient {
    /// Connect to the socket at `path`.
    pub fn connect(path: &Path, timeout: Duration) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            timeout,
            stream: Some(unix_sock::connect(path, timeout)?),
        })
    }

    /// Pid owning the focused window.
    ///
    /// `Ok(None)` when the tree has no focused application window.
    pub fn get_focused_pid(&mut self) -> Result<Option<u32>> {
        let json = self.exchange(MsgType::GetTree, b"", |stream, len| {
            let mut payload = vec![0u8; len];
            unix_sock::read_full(stream, &mut payload)?;
            Ok(payload)
        })?;
        tree::focused_pid(&json)
    }

    /// Run `focus <dir>`. The reply payload is drained unread.
    pub fn focus(&mut self, dir: Direction) -> Result<()> {
        let cmd = format!("focus {dir}");
        self.exchange(MsgType::RunCommand, cmd.as_bytes(), |stream, len| {
            Ok(unix_sock::drain(stream, len)?)
        })
    }

    /// One request/reply on the current connection, opening one if needed.
    /// `read` consumes exactly the announced payload. The connection is kept
    /// only when the whole exchange succeeds.
    fn exchange<T, F>(&mut self, kind: MsgType, payload: &[u8], read: F) -> Result<T>
    where
        F: FnOnce(&mut UnixStream, usize) -> Result<T>,
    {
        let mut stream = match self.stream.take() {
            Some(stream) => stream,
            None => {
                debug!(path = %self.path.display(), "reconnecting to window manager");
                unix_sock::connect(&self.path, self.timeout)?
            }
        };
        let res = send(&mut stream, kind, payload).and_then(|len| read(&mut stream, len));
        if res.is_ok() {
            self.stream = Some(stream);
        }
        res
    }
}

/// Send one message and read the reply header. Returns the payload length.
fn send(stream: &mut UnixStream, kind: MsgType, payload: &[u8]) -> Result<usize> {
    trace!(?kind, len = payload.len(), "ipc request");
    unix_sock::write_full(stream, &wire::encode(kind, payload))?;
    let mut header = [0u8; HEADER_LEN];
    unix_sock::read_full(stream, &mut header)?;
    let (len, got) = wire::decode_header(&header)?;
    if got != kind.code() {
        return Err(Error::UnexpectedType {
            expected: kind.code(),
            got,
        });
    }
    if len > MAX_PAYLOAD {
        return Err(Error::PayloadTooLarge(len));
    }
    trace!(len, "ipc reply");
    Ok(len as usize)
}

impl WindowFocus for SwayClient {
    type Error = Error;

    fn focused_pid(&mut self) -> Option<u32> {
        match self.get_focused_pid() {
            Ok(pid) => pid,
            Err(e) => {
                debug!(error = %e, "focused pid lookup failed");
                None
            }
        }
    }

    fn move_focus(&mut self, dir: Direction) -> Result<()> {
        self.focus(dir)
    }
}
