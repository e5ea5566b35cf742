//! The slice of msgpack-RPC needed to call Neovim.
//!
//! Requests are always `[0, msgid, method, [arg]]` with a single string
//! argument; responses are only accepted when shaped `[1, msgid, nil, uint]`.
//! Nothing else is supported.

use rmp::{Marker, encode};
use thiserror::Error;

/// Longest string the encoder accepts (fixstr or str8).
pub const MAX_STR_LEN: usize = u8::MAX as usize;

/// msgpack-RPC message type for requests.
const TYPE_REQUEST: u64 = 0;
/// msgpack-RPC message type for responses.
const TYPE_RESPONSE: u64 = 1;

/// Errors building a request frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The string needs a str16/str32 header, which is not supported.
    #[error("string of {0} bytes exceeds the supported {MAX_STR_LEN}")]
    StringTooLong(usize),
    /// Writing to the output buffer failed.
    #[error("msgpack write failed: {0}")]
    Write(String),
}

/// Errors parsing a response frame.
///
/// [`DecodeError::TooShort`] means "keep reading"; every other variant means
/// the frame is complete but unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ends before the frame does.
    #[error("response truncated")]
    TooShort,
    /// The frame does not start with a four-element array header.
    #[error("response is not a 4-element array")]
    NotArray,
    /// The message type is not 1.
    #[error("message is not a response")]
    NotResponse,
    /// The reply belongs to another request.
    #[error("response id mismatch: expected {expected}, got {got:?}")]
    IdMismatch {
        /// Id we sent.
        expected: u32,
        /// Id we received, when it was an unsigned integer at all.
        got: Option<u64>,
    },
    /// The peer reported an error.
    #[error("remote returned an error")]
    Remote,
    /// The result is not an unsigned integer.
    #[error("result is not an unsigned integer")]
    BadResult,
}

/// A decoded request, as seen by a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Message type; 0 for requests.
    pub kind: u64,
    /// Request id.
    pub msgid: u64,
    /// Method name.
    pub method: String,
    /// The single argument.
    pub arg: String,
}

/// Encode `[0, msgid, method, [arg]]`.
pub fn encode_request(msgid: u32, method: &str, arg: &str) -> Result<Vec<u8>, EncodeError> {
    check_len(method)?;
    check_len(arg)?;
    let mut buf = Vec::with_capacity(16 + method.len() + arg.len());
    encode::write_array_len(&mut buf, 4).map_err(write_err)?;
    encode::write_pfix(&mut buf, TYPE_REQUEST as u8).map_err(write_err)?;
    encode::write_u32(&mut buf, msgid).map_err(write_err)?;
    encode::write_str(&mut buf, method).map_err(write_err)?;
    encode::write_array_len(&mut buf, 1).map_err(write_err)?;
    encode::write_str(&mut buf, arg).map_err(write_err)?;
    Ok(buf)
}

/// Decode `[1, msgid, nil, uint]` and return the integer.
pub fn decode_response(buf: &[u8], expected: u32) -> Result<u64, DecodeError> {
    let mut rd = Reader::new(buf);
    if rd.marker()? != Marker::FixArray(4) {
        return Err(DecodeError::NotArray);
    }
    if rd.uint()? != Some(TYPE_RESPONSE) {
        return Err(DecodeError::NotResponse);
    }
    let got = rd.uint()?;
    if got != Some(u64::from(expected)) {
        return Err(DecodeError::IdMismatch { expected, got });
    }
    if rd.marker()? != Marker::Null {
        return Err(DecodeError::Remote);
    }
    rd.uint()?.ok_or(DecodeError::BadResult)
}

/// Decode a request frame produced by [`encode_request`].
pub fn decode_request(buf: &[u8]) -> Result<Request, DecodeError> {
    let mut rd = Reader::new(buf);
    if rd.marker()? != Marker::FixArray(4) {
        return Err(DecodeError::NotArray);
    }
    let kind = rd.uint()?.ok_or(DecodeError::NotResponse)?;
    let msgid = rd.uint()?.ok_or(DecodeError::BadResult)?;
    let method = rd.str()?.ok_or(DecodeError::BadResult)?;
    if rd.marker()? != Marker::FixArray(1) {
        return Err(DecodeError::NotArray);
    }
    let arg = rd.str()?.ok_or(DecodeError::BadResult)?;
    Ok(Request {
        kind,
        msgid,
        method,
        arg,
    })
}

/// Reject strings that would need more than a str8 header.
fn check_len(s: &str) -> Result<(), EncodeError> {
    if s.len() > MAX_STR_LEN {
        Err(EncodeError::StringTooLong(s.len()))
    } else {
        Ok(())
    }
}

/// Map any rmp write error into [`EncodeError::Write`].
fn write_err<E: ToString>(e: E) -> EncodeError {
    EncodeError::Write(e.to_string())
}

/// Cursor over a response buffer. Running off the end is always
/// [`DecodeError::TooShort`].
struct Reader<'a> {
    /// Unread bytes.
    rest: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Reader positioned at the start of `buf`.
    fn new(buf: &'a [u8]) -> Self {
        Self { rest: buf }
    }

    /// Consume `n` bytes.
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.rest.len() < n {
            return Err(DecodeError::TooShort);
        }
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        Ok(head)
    }

    /// Consume one marker byte.
    fn marker(&mut self) -> Result<Marker, DecodeError> {
        Ok(Marker::from_u8(self.take(1)?[0]))
    }

    /// Consume a big-endian unsigned integer of `n` bytes.
    fn be(&mut self, n: usize) -> Result<u64, DecodeError> {
        Ok(self
            .take(n)?
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
    }

    /// Consume an unsigned integer. `Ok(None)` when the next value has some
    /// other type; its payload is left unread.
    fn uint(&mut self) -> Result<Option<u64>, DecodeError> {
        let v = match self.marker()? {
            Marker::FixPos(n) => u64::from(n),
            Marker::U8 => self.be(1)?,
            Marker::U16 => self.be(2)?,
            Marker::U32 => self.be(4)?,
            Marker::U64 => self.be(8)?,
            _ => return Ok(None),
        };
        Ok(Some(v))
    }

    /// Consume a fixstr or str8.
    fn str(&mut self) -> Result<Option<String>, DecodeError> {
        let len = match self.marker()? {
            Marker::FixStr(n) => usize::from(n),
            Marker::Str8 => self.be(1)? as usize,
            _ => return Ok(None),
        };
        let bytes = self.take(len)?;
        Ok(Some(String::from_utf8_lossy(bytes).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Build `[1, msgid, nil, <result bytes>]`.
    fn response(msgid: u32, result: &[u8]) -> Vec<u8> {
        let mut v = vec![0x94, 0x01, 0xce];
        v.extend_from_slice(&msgid.to_be_bytes());
        v.push(0xc0);
        v.extend_from_slice(result);
        v
    }

    #[test]
    fn request_layout_is_exact() {
        let buf = encode_request(7, "nvim_eval", "winnr()").unwrap();
        let mut want = vec![0x94, 0x00, 0xce, 0, 0, 0, 7, 0xa9];
        want.extend_from_slice(b"nvim_eval");
        want.extend_from_slice(&[0x91, 0xa7]);
        want.extend_from_slice(b"winnr()");
        assert_eq!(buf, want);
    }

    #[test]
    fn medium_strings_use_str8() {
        let arg = "x".repeat(200);
        let buf = encode_request(1, "m", &arg).unwrap();
        let at = buf.len() - 200 - 2;
        assert_eq!(&buf[at..at + 2], &[0xd9, 200]);
    }

    #[test]
    fn long_strings_are_rejected() {
        let long = "x".repeat(256);
        assert_eq!(
            encode_request(1, "nvim_command", &long),
            Err(EncodeError::StringTooLong(256))
        );
        assert_eq!(
            encode_request(1, &long, "x"),
            Err(EncodeError::StringTooLong(256))
        );
        assert!(encode_request(1, "m", &"x".repeat(255)).is_ok());
    }

    #[test]
    fn decodes_every_unsigned_width() {
        let cases: [(&[u8], u64); 5] = [
            (&[0x05], 5),
            (&[0xcc, 0xc8], 200),
            (&[0xcd, 0x12, 0x34], 0x1234),
            (&[0xce, 0, 1, 0, 0], 0x1_0000),
            (&[0xcf, 0, 0, 0, 1, 0, 0, 0, 0], 1 << 32),
        ];
        for (bytes, want) in cases {
            assert_eq!(decode_response(&response(9, bytes), 9), Ok(want));
        }
    }

    #[test]
    fn each_failure_is_distinct() {
        assert_eq!(decode_response(&[], 1), Err(DecodeError::TooShort));
        assert_eq!(
            decode_response(&[0x93, 0x01, 0x01, 0xc0], 1),
            Err(DecodeError::NotArray)
        );
        assert_eq!(
            decode_response(&[0x94, 0x02, 0x01, 0xc0, 0x01], 1),
            Err(DecodeError::NotResponse)
        );
        assert_eq!(
            decode_response(&response(3, &[0x01]), 4),
            Err(DecodeError::IdMismatch {
                expected: 4,
                got: Some(3)
            })
        );
        assert_eq!(
            decode_response(&[0x94, 0x01, 0x04, 0x92, 0x00, 0xa1, b'e', 0xc0], 4),
            Err(DecodeError::Remote)
        );
        assert_eq!(
            decode_response(&response(4, &[0xa1, b'x']), 4),
            Err(DecodeError::BadResult)
        );
        assert_eq!(
            decode_response(&response(4, &[0xd0, 0x01]), 4),
            Err(DecodeError::BadResult)
        );
        assert_eq!(
            decode_response(&response(4, &[0xc0]), 4),
            Err(DecodeError::BadResult)
        );
    }

    #[test]
    fn remote_error_payload_is_not_parsed() {
        // Error slot marker only; the payload never arrived.
        assert_eq!(
            decode_response(&[0x94, 0x01, 0x04, 0x92], 4),
            Err(DecodeError::Remote)
        );
    }

    proptest! {
        #[test]
        fn request_roundtrip(
            msgid in any::<u32>(),
            method in "[a-z_]{1,255}",
            arg in "\\PC{0,60}",
        ) {
            prop_assume!(arg.len() <= MAX_STR_LEN);
            let buf = encode_request(msgid, &method, &arg).unwrap();
            let req = decode_request(&buf).unwrap();
            prop_assert_eq!(req.kind, 0);
            prop_assert_eq!(req.msgid, u64::from(msgid));
            prop_assert_eq!(req.method, method);
            prop_assert_eq!(req.arg, arg);
        }

        #[test]
        fn oversized_strings_never_encode(len in 256usize..1024) {
            let s = "a".repeat(len);
            prop_assert_eq!(encode_request(0, "m", &s), Err(EncodeError::StringTooLong(len)));
        }

        #[test]
        fn truncation_is_always_too_short(msgid in any::<u32>(), n in any::<u64>()) {
            let mut result = vec![0xcf];
            result.extend_from_slice(&n.to_be_bytes());
            let full = response(msgid, &result);
            prop_assert_eq!(decode_response(&full, msgid), Ok(n));
            for cut in 0..full.len() {
                prop_assert_eq!(decode_response(&full[..cut], msgid), Err(DecodeError::TooShort));
            }
        }

        #[test]
        fn any_width_decodes(msgid in any::<u32>(), n in any::<u64>()) {
            let mut result = Vec::new();
            encode::write_uint(&mut result, n).unwrap();
            prop_assert_eq!(decode_response(&response(msgid, &result), msgid), Ok(n));
        }
    }
}
