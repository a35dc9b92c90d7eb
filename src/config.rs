//! Interface configuration parameters
//!
//! Serial settings are kept as per-stream arrays (one element per board
//! serial port) so the RPC layer can expose each as an array property.
//! Values start from the defaults below and may be changed at runtime
//! over RPC; nothing is persisted across resets.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::protocol::codec::REQUEST_SIZE_MAX;
use crate::protocol::key::CommandKey;

/// Name reported by `getDeviceId`.
pub const DEVICE_NAME: &str = "toydad_interface";
/// Board form factor this firmware targets.
pub const FORM_FACTOR: &str = "5x3";
/// Firmware name reported by `getDeviceInfo`.
pub const FIRMWARE_NAME: &str = "ToydadInterface";
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of serial streams on the 5x3 board.
pub const SERIAL_STREAM_COUNT: usize = 2;

pub const BAUD_DEFAULT: u32 = 9600;
pub const BAUD_SUBSET: [u32; 5] = [9600, 19200, 38400, 57600, 115200];

pub const TIMEOUT_DEFAULT_MS: u32 = 1000;
pub const TIMEOUT_MIN_MS: u32 = 10;
pub const TIMEOUT_MAX_MS: u32 = 10_000;

/// Prefix written before every command key.
pub const LINE_BEGINNING_DEFAULT: &str = "\r";

// ---------------------------------------------------------------------------
// Frame format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Data bits, parity and stop bits, named the usual way ("8N1").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameFormat {
    #[serde(rename = "8N1")]
    Format8N1,
    #[serde(rename = "8N2")]
    Format8N2,
    #[serde(rename = "8E1")]
    Format8E1,
    #[serde(rename = "8O1")]
    Format8O1,
    #[serde(rename = "7E1")]
    Format7E1,
    #[serde(rename = "7O1")]
    Format7O1,
}

impl FrameFormat {
    pub const ALL: [Self; 6] = [
        Self::Format8N1,
        Self::Format8N2,
        Self::Format8E1,
        Self::Format8O1,
        Self::Format7E1,
        Self::Format7O1,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Format8N1 => "8N1",
            Self::Format8N2 => "8N2",
            Self::Format8E1 => "8E1",
            Self::Format8O1 => "8O1",
            Self::Format7E1 => "7E1",
            Self::Format7O1 => "7O1",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    pub const fn data_bits(self) -> u8 {
        match self {
            Self::Format7E1 | Self::Format7O1 => 7,
            _ => 8,
        }
    }

    pub const fn parity(self) -> Parity {
        match self {
            Self::Format8N1 | Self::Format8N2 => Parity::None,
            Self::Format8E1 | Self::Format7E1 => Parity::Even,
            Self::Format8O1 | Self::Format7O1 => Parity::Odd,
        }
    }

    pub const fn stop_bits(self) -> u8 {
        match self {
            Self::Format8N2 => 2,
            _ => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Line ending
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineEnding {
    #[serde(rename = "LF")]
    Lf,
    #[serde(rename = "CR")]
    Cr,
    #[serde(rename = "CRLF")]
    CrLf,
}

impl LineEnding {
    pub const ALL: [Self; 3] = [Self::Lf, Self::Cr, Self::CrLf];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "LF",
            Self::Cr => "CR",
            Self::CrLf => "CRLF",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == s)
    }

    /// Bytes terminating each line on the wire.
    pub const fn bytes(self) -> &'static [u8] {
        match self {
            Self::Lf => b"\n",
            Self::Cr => b"\r",
            Self::CrLf => b"\r\n",
        }
    }
}

// ---------------------------------------------------------------------------
// Per-stream settings
// ---------------------------------------------------------------------------

/// Everything a transport needs to talk on one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub baud: u32,
    pub format: FrameFormat,
    pub line_ending: LineEnding,
    pub timeout_ms: u32,
}

impl StreamSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_ms))
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            baud: BAUD_DEFAULT,
            format: FrameFormat::Format8N1,
            line_ending: LineEnding::Cr,
            timeout_ms: TIMEOUT_DEFAULT_MS,
        }
    }
}

/// Serial properties, one array element per stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    pub bauds: [u32; SERIAL_STREAM_COUNT],
    pub formats: [FrameFormat; SERIAL_STREAM_COUNT],
    pub line_endings: [LineEnding; SERIAL_STREAM_COUNT],
    pub timeouts_ms: [u32; SERIAL_STREAM_COUNT],
}

impl Default for SerialConfig {
    fn default() -> Self {
        let s = StreamSettings::default();
        Self {
            bauds: [s.baud; SERIAL_STREAM_COUNT],
            formats: [s.format; SERIAL_STREAM_COUNT],
            line_endings: [s.line_ending; SERIAL_STREAM_COUNT],
            timeouts_ms: [s.timeout_ms; SERIAL_STREAM_COUNT],
        }
    }
}

impl SerialConfig {
    /// Settings for a single stream.
    pub fn stream(&self, index: usize) -> Result<StreamSettings, ConfigError> {
        if index >= SERIAL_STREAM_COUNT {
            return Err(ConfigError::InvalidStream(index));
        }
        Ok(StreamSettings {
            baud: self.bauds[index],
            format: self.formats[index],
            line_ending: self.line_endings[index],
            timeout_ms: self.timeouts_ms[index],
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for baud in self.bauds {
            validate_baud(baud)?;
        }
        for timeout in self.timeouts_ms {
            validate_timeout(timeout)?;
        }
        Ok(())
    }
}

pub fn validate_baud(baud: u32) -> Result<(), ConfigError> {
    if BAUD_SUBSET.contains(&baud) {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed("baud not in supported subset"))
    }
}

pub fn validate_timeout(timeout_ms: u32) -> Result<(), ConfigError> {
    if (TIMEOUT_MIN_MS..=TIMEOUT_MAX_MS).contains(&timeout_ms) {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed("timeout out of range"))
    }
}

// ---------------------------------------------------------------------------
// Detector link
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Stream the detector is wired to.
    pub stream: usize,
    /// Marker sent ahead of every key.
    pub line_beginning: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            stream: 1,
            line_beginning: LINE_BEGINNING_DEFAULT.to_string(),
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream >= SERIAL_STREAM_COUNT {
            return Err(ConfigError::InvalidStream(self.stream));
        }
        if self.line_beginning.len() + CommandKey::SIZE >= REQUEST_SIZE_MAX {
            return Err(ConfigError::ValidationFailed("line beginning too long"));
        }
        Ok(())
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub serial: SerialConfig,
    pub detector: DetectorConfig,
}

impl InterfaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.serial.validate()?;
        self.detector.validate()
    }

    /// Settings of the stream the detector is wired to.
    pub fn detector_stream(&self) -> Result<StreamSettings, ConfigError> {
        self.serial.stream(self.detector.stream)
    }
}
