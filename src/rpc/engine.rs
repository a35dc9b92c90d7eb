//! RPC engine: dispatches JSON requests to the detector and the
//! serial configuration.
//!
//! **Transport-decoupled**: the engine does not own the console link.
//! Callers feed one request line via [`RpcServer::handle_line`] and get
//! one reply line back.  The detector's own serial port is owned by the
//! [`Detector`] inside the engine.
//!
//! Requests take either form:
//!
//! ```text
//! ["getDetectorInfo"]
//! {"id": 7, "method": "bauds", "params": ["setElementValue", 1, 19200]}
//! ```
//!
//! Replies carry the request id and exactly one of `result` / `error`.

use log::{info, warn};
use serde::Serialize;
use serde_json::{Value, json};

use crate::config::{
    self, BAUD_SUBSET, FrameFormat, InterfaceConfig, LineEnding, SERIAL_STREAM_COUNT,
    SerialConfig, TIMEOUT_MAX_MS, TIMEOUT_MIN_MS,
};
use crate::detector::Detector;
use crate::error::{DetectorError, RpcError};
use crate::protocol::transport::SerialPort;

use super::handlers;

// ---------------------------------------------------------------------------
// Request / reply
// ---------------------------------------------------------------------------

/// A decoded request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: Value,
    pub method: String,
    pub params: Vec<Value>,
}

impl Request {
    pub fn from_value(value: Value) -> Result<Self, RpcError> {
        match value {
            Value::Array(mut items) => {
                if items.is_empty() {
                    return Err(RpcError::invalid_request("empty request array"));
                }
                let Value::String(method) = items.remove(0) else {
                    return Err(RpcError::invalid_request("method must be a string"));
                };
                Ok(Self {
                    id: Value::Null,
                    method,
                    params: items,
                })
            }
            Value::Object(mut map) => {
                let id = map.remove("id").unwrap_or(Value::Null);
                let Some(Value::String(method)) = map.remove("method") else {
                    return Err(RpcError::invalid_request("method must be a string"));
                };
                let params = match map.remove("params") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(params)) => params,
                    Some(single) => vec![single],
                };
                Ok(Self { id, method, params })
            }
            _ => Err(RpcError::invalid_request("request must be an array or object")),
        }
    }
}

/// One reply line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Reply {
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: Value, error: RpcError) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                "{{\"id\":null,\"error\":{{\"code\":{},\"message\":\"{}\"}}}}",
                RpcError::SERVER_ERROR,
                e
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Method table
// ---------------------------------------------------------------------------

pub const GET_DEVICE_ID: &str = "getDeviceId";
pub const GET_DEVICE_INFO: &str = "getDeviceInfo";
pub const GET_METHODS: &str = "getMethods";
pub const GET_DETECTOR_INFO: &str = "getDetectorInfo";
pub const GET_STATUS: &str = "getStatus";

/// Serial configuration exposed as per-stream array properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Bauds,
    Formats,
    LineEndings,
    Timeouts,
}

impl Property {
    pub const ALL: [Self; 4] = [Self::Bauds, Self::Formats, Self::LineEndings, Self::Timeouts];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Bauds => "bauds",
            Self::Formats => "formats",
            Self::LineEndings => "lineEndings",
            Self::Timeouts => "timeouts",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    fn value(self, serial: &SerialConfig) -> Value {
        match self {
            Self::Bauds => json!(serial.bauds),
            Self::Formats => json!(serial.formats),
            Self::LineEndings => json!(serial.line_endings),
            Self::Timeouts => json!(serial.timeouts_ms),
        }
    }

    fn subset(self) -> Value {
        match self {
            Self::Bauds => json!(BAUD_SUBSET),
            Self::Formats => json!(FrameFormat::ALL),
            Self::LineEndings => json!(LineEnding::ALL),
            Self::Timeouts => json!({ "min": TIMEOUT_MIN_MS, "max": TIMEOUT_MAX_MS }),
        }
    }

    /// Parse, validate and store one element.
    fn set_element(self, serial: &mut SerialConfig, index: usize, value: &Value) -> Result<(), RpcError> {
        if index >= SERIAL_STREAM_COUNT {
            return Err(RpcError::invalid_params(format!("element index {index} out of range")));
        }
        match self {
            Self::Bauds => {
                let baud = as_u32(value)?;
                config::validate_baud(baud)?;
                serial.bauds[index] = baud;
            }
            Self::Formats => {
                serial.formats[index] = value
                    .as_str()
                    .and_then(FrameFormat::parse)
                    .ok_or_else(|| RpcError::invalid_params(format!("unknown format {value}")))?;
            }
            Self::LineEndings => {
                serial.line_endings[index] = value
                    .as_str()
                    .and_then(LineEnding::parse)
                    .ok_or_else(|| RpcError::invalid_params(format!("unknown line ending {value}")))?;
            }
            Self::Timeouts => {
                let timeout = as_u32(value)?;
                config::validate_timeout(timeout)?;
                serial.timeouts_ms[index] = timeout;
            }
        }
        Ok(())
    }

    fn reset_to_default(self, serial: &mut SerialConfig) {
        let defaults = SerialConfig::default();
        match self {
            Self::Bauds => serial.bauds = defaults.bauds,
            Self::Formats => serial.formats = defaults.formats,
            Self::LineEndings => serial.line_endings = defaults.line_endings,
            Self::Timeouts => serial.timeouts_ms = defaults.timeouts_ms,
        }
    }
}

fn as_u32(value: &Value) -> Result<u32, RpcError> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| RpcError::invalid_params(format!("expected unsigned integer, got {value}")))
}

fn as_index(value: Option<&Value>) -> Result<usize, RpcError> {
    value
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(|| RpcError::invalid_params("expected element index"))
}

fn no_params(params: &[Value]) -> Result<(), RpcError> {
    if params.is_empty() {
        Ok(())
    } else {
        Err(RpcError::invalid_params("method takes no parameters"))
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// RPC front end for one detector.
pub struct RpcServer<P: SerialPort> {
    detector: Detector<P>,
    config: InterfaceConfig,
    serial_number: u32,
}

impl<P: SerialPort> RpcServer<P> {
    /// Build the detector driver on `port` and serve it.
    pub fn new(port: P, config: InterfaceConfig) -> Result<Self, DetectorError> {
        let detector = Detector::new(port, &config)?;
        Ok(Self {
            detector,
            config,
            serial_number: 0,
        })
    }

    /// Board serial number reported by `getDeviceId`.
    pub fn set_serial_number(&mut self, serial_number: u32) {
        self.serial_number = serial_number;
    }

    pub fn config(&self) -> &InterfaceConfig {
        &self.config
    }

    pub fn detector(&self) -> &Detector<P> {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut Detector<P> {
        &mut self.detector
    }

    /// Handle one request line.  Blank lines get no reply.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let reply = match serde_json::from_str::<Value>(line) {
            Ok(value) => match Request::from_value(value) {
                Ok(request) => self.dispatch(request),
                Err(e) => Reply::err(Value::Null, e),
            },
            Err(e) => {
                warn!("RPC: unparseable request: {}", e);
                Reply::err(Value::Null, RpcError::parse_error(e))
            }
        };
        Some(reply.to_line())
    }

    /// Dispatch a decoded request.
    pub fn dispatch(&mut self, request: Request) -> Reply {
        let Request { id, method, params } = request;
        info!("RPC: {}", method);
        match self.call(&method, &params) {
            Ok(result) => Reply::ok(id, result),
            Err(e) => {
                warn!("RPC: {} failed: {}", method, e);
                Reply::err(id, e)
            }
        }
    }

    fn call(&mut self, method: &str, params: &[Value]) -> Result<Value, RpcError> {
        match method {
            GET_DETECTOR_INFO => {
                no_params(params)?;
                let info = handlers::get_detector_info(&mut self.detector)?;
                Ok(json!(info))
            }
            GET_STATUS => {
                no_params(params)?;
                let report = handlers::get_status_report(&mut self.detector)?;
                Ok(json!(report))
            }
            GET_DEVICE_ID => {
                no_params(params)?;
                Ok(json!({
                    "name": config::DEVICE_NAME,
                    "form_factor": config::FORM_FACTOR,
                    "serial_number": self.serial_number,
                }))
            }
            GET_DEVICE_INFO => {
                no_params(params)?;
                Ok(json!({
                    "firmware": [{
                        "name": config::FIRMWARE_NAME,
                        "version": config::FIRMWARE_VERSION,
                    }],
                    "serial_stream_count": SERIAL_STREAM_COUNT,
                    "detector_stream": self.config.detector.stream,
                }))
            }
            GET_METHODS => {
                no_params(params)?;
                let properties: Vec<&str> = Property::ALL.iter().map(|p| p.name()).collect();
                Ok(json!({
                    "methods": [
                        GET_DEVICE_ID,
                        GET_DEVICE_INFO,
                        GET_METHODS,
                        GET_DETECTOR_INFO,
                        GET_STATUS,
                    ],
                    "properties": properties,
                }))
            }
            other => match Property::from_name(other) {
                Some(property) => self.call_property(property, params),
                None => Err(RpcError::method_not_found(other)),
            },
        }
    }

    fn call_property(&mut self, property: Property, params: &[Value]) -> Result<Value, RpcError> {
        let (op, args) = match params.split_first() {
            None => ("getValue", &[][..]),
            Some((Value::String(op), args)) => (op.as_str(), args),
            Some(_) => return Err(RpcError::invalid_params("property operation must be a string")),
        };

        match op {
            "getValue" => Ok(property.value(&self.config.serial)),
            "getDefaultValue" => Ok(property.value(&SerialConfig::default())),
            "getSubset" => Ok(property.subset()),
            "setValue" => {
                let Some(Value::Array(values)) = args.first() else {
                    return Err(RpcError::invalid_params("setValue expects an array"));
                };
                if values.len() != SERIAL_STREAM_COUNT {
                    return Err(RpcError::invalid_params(format!(
                        "setValue expects {SERIAL_STREAM_COUNT} elements"
                    )));
                }
                let mut serial = self.config.serial.clone();
                for (index, value) in values.iter().enumerate() {
                    property.set_element(&mut serial, index, value)?;
                }
                self.commit(property, serial)
            }
            "setElementValue" => {
                let index = as_index(args.first())?;
                let value = args
                    .get(1)
                    .ok_or_else(|| RpcError::invalid_params("setElementValue expects a value"))?;
                let mut serial = self.config.serial.clone();
                property.set_element(&mut serial, index, value)?;
                self.commit(property, serial)
            }
            "setValueToDefault" => {
                let mut serial = self.config.serial.clone();
                property.reset_to_default(&mut serial);
                self.commit(property, serial)
            }
            other => Err(RpcError::method_not_found(&format!("{}.{}", property.name(), other))),
        }
    }

    /// Store a new serial config and push the detector stream's settings
    /// to the port.
    fn commit(&mut self, property: Property, serial: SerialConfig) -> Result<Value, RpcError> {
        serial.validate()?;
        let settings = serial.stream(self.config.detector.stream)?;
        self.detector
            .configure(&settings)
            .map_err(|e| RpcError::server_error("Serial port rejected settings", Some(e.to_string())))?;
        self.config.serial = serial;
        info!("RPC: {} = {}", property.name(), property.value(&self.config.serial));
        Ok(property.value(&self.config.serial))
    }
}
