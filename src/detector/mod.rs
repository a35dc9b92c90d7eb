//! TOYDAD detector driver.
//!
//! Each accessor performs exactly one round trip:
//!
//! ```text
//!  Idle ──build_request──▶ RequestSent ──write_read──▶ Matched ──▶ Idle
//!                                                  └──▶ Unmatched ─▶ Idle
//! ```
//!
//! Accessors take `&mut self`, so one driver can never have two requests
//! in flight.  Share a driver between threads only behind a lock.

pub mod status;

use log::{debug, warn};
use serde::Serialize;

use crate::config::{InterfaceConfig, StreamSettings};
use crate::error::{DetectorError, Result};
use crate::protocol::codec::{Response, build_request, parse_response, send_and_receive};
use crate::protocol::key::CommandKey;
use crate::protocol::transport::SerialPort;

pub use status::Status;

/// Identity strings, in the order the detector is queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectorInfo {
    pub detector_name: String,
    pub hardware_version: String,
    pub model: String,
    pub firmware_version: String,
    pub serial_number: String,
}

/// Driver for one detector on one serial port.
pub struct Detector<P: SerialPort> {
    port: P,
    line_beginning: String,
}

impl<P: SerialPort> Detector<P> {
    /// Validate `config`, apply the detector stream's settings to `port`
    /// and return a ready driver.
    pub fn new(port: P, config: &InterfaceConfig) -> Result<Self> {
        config.validate()?;
        let mut detector = Self {
            port,
            line_beginning: config.detector.line_beginning.clone(),
        };
        detector.configure(&config.detector_stream()?)?;
        Ok(detector)
    }

    /// Re-apply stream settings (after an RPC property change).
    pub fn configure(&mut self, settings: &StreamSettings) -> Result<()> {
        self.port.configure(settings).map_err(|e| {
            warn!("detector: port rejected {:?}: {:?}", settings, e);
            DetectorError::PortSetup
        })
    }

    pub fn line_beginning(&self) -> &str {
        &self.line_beginning
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn into_port(self) -> P {
        self.port
    }

    // ── Round trip ────────────────────────────────────────────

    /// Send `key` and return the reply once its echoed key checks out.
    pub fn query(&mut self, key: CommandKey) -> Result<Response> {
        let frame = build_request(&self.line_beginning, key)?;
        debug!("detector: -> {}", key);
        let response = send_and_receive(&mut self.port, &frame)?;
        if let Err(e) = parse_response(response.as_bytes(), key) {
            warn!("detector: {} failed: {}", key, e);
            return Err(e.into());
        }
        Ok(response)
    }

    fn query_string(&mut self, key: CommandKey) -> Result<String> {
        self.query(key).map(|r| r.payload_string())
    }

    // ── Liveness ──────────────────────────────────────────────

    /// `true` when a detector-name query succeeds.  Not cached: every
    /// call is a full round trip.
    pub fn communicating(&mut self) -> bool {
        self.detector_name().is_ok()
    }

    // ── Identity accessors ────────────────────────────────────

    pub fn detector_name(&mut self) -> Result<String> {
        self.query_string(CommandKey::DETECTOR_NAME)
    }

    pub fn hardware_version(&mut self) -> Result<String> {
        self.query_string(CommandKey::HARDWARE_VERSION)
    }

    pub fn model(&mut self) -> Result<String> {
        self.query_string(CommandKey::MODEL)
    }

    pub fn firmware_version(&mut self) -> Result<String> {
        self.query_string(CommandKey::FIRMWARE_VERSION)
    }

    pub fn serial_number(&mut self) -> Result<String> {
        self.query_string(CommandKey::SERIAL_NUMBER)
    }

    /// All five identity strings; stops at the first failed read.
    pub fn info(&mut self) -> Result<DetectorInfo> {
        Ok(DetectorInfo {
            detector_name: self.detector_name()?,
            hardware_version: self.hardware_version()?,
            model: self.model()?,
            firmware_version: self.firmware_version()?,
            serial_number: self.serial_number()?,
        })
    }

    // ── Status ────────────────────────────────────────────────

    /// Current operating status, freshly queried.
    pub fn status(&mut self) -> Result<Status> {
        let response = self.query(CommandKey::STATUS)?;
        status::decode_status(response.payload())
    }
}
