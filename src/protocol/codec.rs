//! Key-tagged request/response codec.
//!
//! Wire format:
//! ```text
//! request:  ┌────────────────┬─────────┐
//!           │ line beginning │ key (3) │   + line ending (transport)
//!           └────────────────┴─────────┘
//! response: ┌─────────┬──────────────────────┐
//!           │ key (3) │ payload (NUL-ended)  │
//!           └─────────┴──────────────────────┘
//! ```
//!
//! One request produces one response.  Each exchange owns a fresh
//! [`Response`] buffer, so a short or empty reply can never be matched
//! against bytes left behind by an earlier exchange.

use heapless::Vec;
use log::{debug, warn};

use crate::error::ProtocolError;

use super::key::CommandKey;
use super::transport::SerialPort;

/// Request buffer capacity.  One byte stays reserved, so
/// `line_beginning + key` must be strictly shorter than this.
pub const REQUEST_SIZE_MAX: usize = 16;

/// Largest response the transport may return for one request.
pub const RESPONSE_SIZE_MAX: usize = 64;

/// Payload starts right after the echoed key.
pub const RESPONSE_DATA_OFFSET: usize = CommandKey::SIZE;

/// An encoded request, ready for the transport.
pub type RequestFrame = Vec<u8, REQUEST_SIZE_MAX>;

/// Concatenate `line_beginning` and `key` into a request frame.
pub fn build_request(line_beginning: &str, key: CommandKey) -> Result<RequestFrame, ProtocolError> {
    let len = line_beginning.len() + CommandKey::SIZE;
    if len >= REQUEST_SIZE_MAX {
        return Err(ProtocolError::RequestTooLong {
            len,
            max: REQUEST_SIZE_MAX - 1,
        });
    }

    let mut frame = RequestFrame::new();
    // Capacity checked above.
    frame
        .extend_from_slice(line_beginning.as_bytes())
        .and_then(|()| frame.extend_from_slice(key.as_bytes()))
        .map_err(|()| ProtocolError::RequestTooLong {
            len,
            max: REQUEST_SIZE_MAX - 1,
        })?;
    Ok(frame)
}

/// Raw bytes of one reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    buf: Vec<u8, RESPONSE_SIZE_MAX>,
}

impl Response {
    /// Copy up to `RESPONSE_SIZE_MAX` bytes of `raw`.
    pub fn from_slice(raw: &[u8]) -> Self {
        let len = raw.len().min(RESPONSE_SIZE_MAX);
        let mut buf = Vec::new();
        // `len` never exceeds capacity.
        let _ = buf.extend_from_slice(&raw[..len]);
        Self { buf }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Echoed key, if the reply is long enough to carry one.
    pub fn key(&self) -> Option<&[u8]> {
        self.buf.get(..CommandKey::SIZE)
    }

    /// Bytes after the key, cut at the first NUL.
    pub fn payload(&self) -> &[u8] {
        payload_of(&self.buf)
    }

    /// Payload as text (invalid UTF-8 is replaced, not rejected).
    pub fn payload_string(&self) -> String {
        String::from_utf8_lossy(self.payload()).into_owned()
    }
}

fn payload_of(raw: &[u8]) -> &[u8] {
    let data = raw.get(RESPONSE_DATA_OFFSET..).unwrap_or(&[]);
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    &data[..end]
}

/// Check the echoed key of `raw` against `expected` and return the payload.
///
/// An empty or truncated reply is [`ProtocolError::NoResponse`]; a reply
/// carrying any other key is [`ProtocolError::KeyMismatch`].
pub fn parse_response(raw: &[u8], expected: CommandKey) -> Result<&[u8], ProtocolError> {
    let Some(echoed) = raw.get(..CommandKey::SIZE) else {
        return Err(ProtocolError::NoResponse);
    };

    if !expected.matches(echoed) {
        let mut received = [0u8; CommandKey::SIZE];
        received.copy_from_slice(echoed);
        return Err(ProtocolError::KeyMismatch { expected, received });
    }

    Ok(payload_of(raw))
}

/// Run one blocking exchange over `port`.
///
/// Transport errors are logged and folded into `NoResponse`: at this layer
/// a broken link and a silent device look the same.
pub fn send_and_receive<P: SerialPort>(
    port: &mut P,
    frame: &[u8],
) -> Result<Response, ProtocolError> {
    let mut raw = [0u8; RESPONSE_SIZE_MAX];
    match port.write_read(frame, &mut raw) {
        Ok(n) => {
            let response = Response::from_slice(&raw[..n.min(RESPONSE_SIZE_MAX)]);
            debug!("serial: {} byte request, {} byte response", frame.len(), response.len());
            Ok(response)
        }
        Err(e) => {
            warn!("serial: transport error: {:?}", e);
            Err(ProtocolError::NoResponse)
        }
    }
}
