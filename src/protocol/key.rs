//! Three-character command keys.
//!
//! Every request names its command with a key such as `DTr`, and the
//! detector echoes the same key at the start of its reply.  The trailing
//! lowercase `r` marks a read command.

use core::fmt;

use crate::error::KeyError;

/// A validated 3-byte ASCII command key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandKey([u8; CommandKey::SIZE]);

impl CommandKey {
    /// Length of every key on the wire.
    pub const SIZE: usize = 3;

    pub const DETECTOR_NAME: Self = Self(*b"DTr");
    pub const HARDWARE_VERSION: Self = Self(*b"HWr");
    pub const MODEL: Self = Self(*b"MDr");
    pub const FIRMWARE_VERSION: Self = Self(*b"SWr");
    pub const SERIAL_NUMBER: Self = Self(*b"SNr");
    pub const STATUS: Self = Self(*b"STr");

    /// Validate an arbitrary key string.
    pub fn new(key: &str) -> Result<Self, KeyError> {
        let bytes = key.as_bytes();
        let arr: [u8; Self::SIZE] = bytes
            .try_into()
            .map_err(|_| KeyError::BadLength(bytes.len()))?;
        if !arr.iter().all(u8::is_ascii_graphic) {
            return Err(KeyError::NotAscii);
        }
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Constructors only admit ASCII.
        core::str::from_utf8(&self.0).unwrap_or("???")
    }

    /// Byte-for-byte comparison against the head of a response.
    pub fn matches(&self, echoed: &[u8]) -> bool {
        echoed == self.0
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
