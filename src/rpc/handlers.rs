//! Detector RPC handlers.
//!
//! Both handlers check liveness first and do no further work when the
//! detector is silent.  A composite reply is all-or-nothing: if any field
//! read fails after the liveness check, the caller gets the same
//! not-communicating error and no fields.

use log::warn;
use serde::Serialize;

use crate::detector::{Detector, DetectorInfo};
use crate::error::{DetectorError, RpcError};
use crate::protocol::transport::SerialPort;

pub const NOT_COMMUNICATING_ERROR: &str = "Detector not communicating";
pub const UNKNOWN_STATUS_ERROR: &str = "Detector reported unknown status";

/// Result of `getStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
}

pub fn not_communicating() -> RpcError {
    RpcError::server_error(NOT_COMMUNICATING_ERROR, None)
}

fn to_rpc_error(e: DetectorError) -> RpcError {
    match e {
        DetectorError::UnknownStatus(code) => {
            RpcError::server_error(UNKNOWN_STATUS_ERROR, Some(code.to_string()))
        }
        _ => not_communicating(),
    }
}

/// `getDetectorInfo`: the five identity strings.
pub fn get_detector_info<P: SerialPort>(
    detector: &mut Detector<P>,
) -> Result<DetectorInfo, RpcError> {
    if !detector.communicating() {
        return Err(not_communicating());
    }
    detector.info().map_err(|e| {
        warn!("RPC: detector info aborted: {}", e);
        to_rpc_error(e)
    })
}

/// `getStatus`: the current status as a label.
pub fn get_status_report<P: SerialPort>(
    detector: &mut Detector<P>,
) -> Result<StatusReport, RpcError> {
    if !detector.communicating() {
        return Err(not_communicating());
    }
    let status = detector.status().map_err(|e| {
        warn!("RPC: status read failed: {}", e);
        to_rpc_error(e)
    })?;
    Ok(StatusReport {
        status: status.label(),
    })
}
