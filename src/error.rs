//! Unified error types for the detector interface firmware.
//!
//! Every fallible path funnels into one of a handful of small `Clone`
//! enums so that the driver, the RPC layer and the tests can all match on
//! the same variants.  The protocol layer only knows two failure kinds:
//! the device did not answer, or it answered with the wrong key.

use core::fmt;

use serde::Serialize;

use crate::protocol::key::CommandKey;

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

/// Failure of one request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Transport returned no bytes (timeout) or fewer bytes than a key.
    NoResponse,
    /// A response arrived but its echoed key differs from the request key.
    KeyMismatch {
        expected: CommandKey,
        /// First key-sized bytes of the response, verbatim.
        received: [u8; CommandKey::SIZE],
    },
    /// Line beginning plus key does not fit the request buffer.
    RequestTooLong { len: usize, max: usize },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => write!(f, "no response from device"),
            Self::KeyMismatch { expected, received } => write!(
                f,
                "key mismatch: expected {}, received {:?}",
                expected,
                String::from_utf8_lossy(received)
            ),
            Self::RequestTooLong { len, max } => {
                write!(f, "request of {len} bytes exceeds limit of {max}")
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

// ---------------------------------------------------------------------------
// Detector errors
// ---------------------------------------------------------------------------

/// Error returned by every [`Detector`](crate::detector::Detector) accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorError {
    Protocol(ProtocolError),
    /// `STr` payload parsed to a code outside the `Status` ordinals.
    UnknownStatus(i32),
    /// Configuration rejected before it reached the port.
    Config(ConfigError),
    /// The serial port refused the stream settings.
    PortSetup,
}

impl DetectorError {
    /// No answer before the transport gave up.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Protocol(ProtocolError::NoResponse))
    }

    /// An answer arrived, tagged with another key.
    pub fn is_key_mismatch(&self) -> bool {
        matches!(self, Self::Protocol(ProtocolError::KeyMismatch { .. }))
    }
}

impl fmt::Display for DetectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::UnknownStatus(code) => write!(f, "unknown status code {code}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::PortSetup => write!(f, "serial port rejected stream settings"),
        }
    }
}

impl std::error::Error for DetectorError {}

impl From<ProtocolError> for DetectorError {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

impl From<ConfigError> for DetectorError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Command key errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// Keys are exactly three bytes.
    BadLength(usize),
    /// Keys are printable ASCII.
    NotAscii,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLength(n) => write!(f, "command key must be 3 bytes, got {n}"),
            Self::NotAscii => write!(f, "command key must be printable ASCII"),
        }
    }
}

impl std::error::Error for KeyError {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stream index outside `0..SERIAL_STREAM_COUNT`.
    InvalidStream(usize),
    /// A field failed range or subset validation.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStream(idx) => write!(f, "no serial stream {idx}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// RPC errors
// ---------------------------------------------------------------------------

/// Error object carried in an RPC reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl RpcError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const SERVER_ERROR: i32 = -32000;

    pub fn new(code: i32, message: &str, data: Option<String>) -> Self {
        Self {
            code,
            message: message.to_string(),
            data,
        }
    }

    pub fn parse_error(detail: impl fmt::Display) -> Self {
        Self::new(Self::PARSE_ERROR, "Parse error", Some(detail.to_string()))
    }

    pub fn invalid_request(detail: &str) -> Self {
        Self::new(Self::INVALID_REQUEST, "Invalid request", Some(detail.to_string()))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(Self::METHOD_NOT_FOUND, "Method not found", Some(method.to_string()))
    }

    pub fn invalid_params(detail: impl fmt::Display) -> Self {
        Self::new(Self::INVALID_PARAMS, "Invalid params", Some(detail.to_string()))
    }

    pub fn server_error(message: &str, detail: Option<String>) -> Self {
        Self::new(Self::SERVER_ERROR, message, detail)
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => write!(f, "{} ({}): {}", self.message, self.code, data),
            None => write!(f, "{} ({})", self.message, self.code),
        }
    }
}

impl std::error::Error for RpcError {}

impl From<ConfigError> for RpcError {
    fn from(e: ConfigError) -> Self {
        Self::invalid_params(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Driver-wide `Result` alias.
pub type Result<T> = core::result::Result<T, DetectorError>;
