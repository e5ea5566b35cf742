use std::{os::unix::net::UnixStream, path::Path, time::Duration};

use tracing::trace;
use unix_sock::Frame;

use crate::{
    Result,
    codec::{self, DecodeError},
};

/// Upper bound on the bytes collected for a single reply.
const RESPONSE_BUDGET: usize = 1024;

/// Method used to evaluate a numeric expression.
const METHOD_EVAL: &str = "nvim_eval";
/// Method used to run an Ex command.
const METHOD_COMMAND: &str = "nvim_command";

/// A blocking connection to one Neovim instance.
pub struct NvimClient {
    /// Connected socket with timeouts applied.
    stream: UnixStream,
    /// Id for the next request.
    next_id: u32,
}

impl NvimClient {
    /// Connect to the socket at `path`, applying `timeout` to every send and receive.
    pub fn connect(path: &Path, timeout: Duration) -> Result<Self> {
        Ok(Self {
            stream: unix_sock::connect(path, timeout)?,
            next_id: 1,
        })
    }

    /// Evaluate `expr` and return its unsigned integer value.
    pub fn eval(&mut self, expr: &str) -> Result<u64> {
        let (msgid, reply) = self.call(METHOD_EVAL, expr)?;
        Ok(codec::decode_response(&reply, msgid)?)
    }

    /// Run an Ex command. The reply is read and discarded.
    pub fn command(&mut self, cmd: &str) -> Result<()> {
        self.call(METHOD_COMMAND, cmd)?;
        Ok(())
    }

    /// Send one request and collect its reply bytes.
    ///
    /// Reading continues only while the reply is truncated. A reply that
    /// decodes to any other error is returned as-is, so the caller can report
    /// the specific failure.
    fn call(&mut self, method: &str, arg: &str) -> Result<(u32, Vec<u8>)> {
        let msgid = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let req = codec::encode_request(msgid, method, arg)?;
        trace!(msgid, method, arg, "nvim request");
        unix_sock::write_full(&mut self.stream, &req)?;
        let reply = unix_sock::read_until(&mut self.stream, RESPONSE_BUDGET, |buf| {
            match codec::decode_response(buf, msgid) {
                Err(DecodeError::TooShort) => Frame::Incomplete,
                _ => Frame::Complete,
            }
        })?;
        trace!(msgid, len = reply.len(), "nvim reply");
        Ok((msgid, reply))
    }
}
