//! Integration tests for the RPC server driving a scripted detector.

use serde_json::{Value, json};

use toydad_interface::config::{InterfaceConfig, SerialConfig};
use toydad_interface::error::RpcError;
use toydad_interface::rpc::engine::RpcServer;
use toydad_interface::rpc::handlers::{NOT_COMMUNICATING_ERROR, UNKNOWN_STATUS_ERROR};

use crate::mock_port::MockPort;

fn server(port: MockPort) -> RpcServer<MockPort> {
    RpcServer::new(port, InterfaceConfig::default()).expect("default config is valid")
}

fn call(server: &mut RpcServer<MockPort>, line: &str) -> Value {
    let reply = server.handle_line(line).expect("non-blank request gets a reply");
    serde_json::from_str(&reply).expect("reply is valid JSON")
}

fn sent(server: &RpcServer<MockPort>) -> Vec<String> {
    server.detector().port().keys_sent()
}

// ── getDetectorInfo ───────────────────────────────────────────

#[test]
fn detector_info_when_silent_is_error_only() {
    let mut s = server(MockPort::new());

    let r = call(&mut s, r#"{"id": 1, "method": "getDetectorInfo"}"#);
    assert_eq!(r["id"], 1);
    assert!(r.get("result").is_none());
    assert_eq!(r["error"]["code"], RpcError::SERVER_ERROR);
    assert_eq!(r["error"]["message"], NOT_COMMUNICATING_ERROR);
    // Only the liveness probe went out.
    assert_eq!(sent(&s), ["DTr"]);
}

#[test]
fn detector_info_when_healthy() {
    let mut s = server(MockPort::healthy());

    let r = call(&mut s, r#"["getDetectorInfo"]"#);
    assert!(r.get("error").is_none());
    assert_eq!(
        r["result"],
        json!({
            "detector_name": "TOYDAD",
            "hardware_version": "V2.1",
            "model": "DAD-2.1L",
            "firmware_version": "01.06",
            "serial_number": "17042",
        })
    );
    let fields: Vec<&String> = r["result"].as_object().unwrap().keys().collect();
    assert_eq!(
        fields,
        ["detector_name", "hardware_version", "model", "firmware_version", "serial_number"]
    );
    assert_eq!(sent(&s), ["DTr", "DTr", "HWr", "MDr", "SWr", "SNr"]);
}

#[test]
fn detector_info_drops_partial_fields() {
    let mut port = MockPort::healthy();
    port.push(b"DTrTOYDAD"); // liveness
    port.push(b"DTrTOYDAD");
    port.push(b"HWrV2.1");
    port.push(b"SWr01.06"); // wrong key for MDr
    let mut s = server(port);

    let r = call(&mut s, r#"["getDetectorInfo"]"#);
    assert!(r.get("result").is_none());
    assert_eq!(r["error"]["message"], NOT_COMMUNICATING_ERROR);
    assert_eq!(sent(&s), ["DTr", "DTr", "HWr", "MDr"]);
}

// ── getStatus ─────────────────────────────────────────────────

#[test]
fn status_reports_label() {
    let mut s = server(MockPort::healthy());

    let r = call(&mut s, r#"["getStatus"]"#);
    assert_eq!(r["result"], json!({ "status": "Measurement" }));
    assert_eq!(sent(&s), ["DTr", "STr"]);
}

#[test]
fn status_when_silent() {
    let mut s = server(MockPort::new());

    let r = call(&mut s, r#"["getStatus"]"#);
    assert!(r.get("result").is_none());
    assert_eq!(r["error"]["message"], NOT_COMMUNICATING_ERROR);
    assert_eq!(sent(&s), ["DTr"]);
}

#[test]
fn status_out_of_range_carries_code() {
    let mut port = MockPort::healthy();
    port.answer("STr", "STr42");
    let mut s = server(port);

    let r = call(&mut s, r#"["getStatus"]"#);
    assert_eq!(r["error"]["code"], RpcError::SERVER_ERROR);
    assert_eq!(r["error"]["message"], UNKNOWN_STATUS_ERROR);
    assert_eq!(r["error"]["data"], "42");
}

#[test]
fn status_is_not_cached() {
    let mut port = MockPort::healthy();
    port.push(b"DTrTOYDAD");
    port.push(b"STr0");
    let mut s = server(port);

    assert_eq!(call(&mut s, r#"["getStatus"]"#)["result"]["status"], "Standby");
    assert_eq!(call(&mut s, r#"["getStatus"]"#)["result"]["status"], "Measurement");
}

#[test]
fn detector_methods_take_no_params() {
    let mut s = server(MockPort::healthy());

    let r = call(&mut s, r#"["getStatus", 1]"#);
    assert_eq!(r["error"]["code"], RpcError::INVALID_PARAMS);
    assert!(sent(&s).is_empty());
}

// ── Serial properties ─────────────────────────────────────────

#[test]
fn set_element_on_detector_stream_reconfigures_port() {
    let mut s = server(MockPort::healthy());

    let r = call(&mut s, r#"["bauds", "setElementValue", 1, 19200]"#);
    assert_eq!(r["result"], json!([9600, 19200]));
    let applied = &s.detector().port().applied;
    assert_eq!(applied.len(), 2);
    assert_eq!(applied.last().map(|a| a.baud), Some(19200));
}

#[test]
fn set_value_then_reset_to_default() {
    let mut s = server(MockPort::healthy());

    let r = call(&mut s, r#"["lineEndings", "setValue", ["LF", "CRLF"]]"#);
    assert_eq!(r["result"], json!(["LF", "CRLF"]));
    let r = call(&mut s, r#"["lineEndings", "getValue"]"#);
    assert_eq!(r["result"], json!(["LF", "CRLF"]));

    call(&mut s, r#"["lineEndings", "setValueToDefault"]"#);
    assert_eq!(s.config().serial, SerialConfig::default());
    let last = s.detector().port().applied.last().copied().unwrap();
    assert_eq!(last, s.config().detector_stream().unwrap());
}

#[test]
fn rejected_settings_are_not_stored() {
    let mut s = server(MockPort::healthy());
    s.detector_mut().port_mut().reject_settings = true;

    let r = call(&mut s, r#"["timeouts", "setElementValue", 1, 250]"#);
    assert_eq!(r["error"]["code"], RpcError::SERVER_ERROR);
    assert_eq!(s.config().serial.timeouts_ms, SerialConfig::default().timeouts_ms);
}

#[test]
fn property_element_index_out_of_range() {
    let mut s = server(MockPort::healthy());

    let r = call(&mut s, r#"["formats", "setElementValue", 2, "8N1"]"#);
    assert_eq!(r["error"]["code"], RpcError::INVALID_PARAMS);
}

// ── Board identity ────────────────────────────────────────────

#[test]
fn device_id_reports_serial_number() {
    let mut s = server(MockPort::new());
    s.set_serial_number(0xBEEF_CAFE);

    let r = call(&mut s, r#"["getDeviceId"]"#);
    assert_eq!(r["result"]["serial_number"], 0xBEEF_CAFE_u32);
    // Board-level methods never touch the detector.
    assert!(sent(&s).is_empty());
}

#[test]
fn methods_lists_detector_calls_and_properties() {
    let mut s = server(MockPort::new());

    let r = call(&mut s, r#"["getMethods"]"#);
    let methods = r["result"]["methods"].as_array().unwrap();
    assert!(methods.contains(&json!("getDetectorInfo")));
    assert!(methods.contains(&json!("getStatus")));
    assert_eq!(
        r["result"]["properties"],
        json!(["bauds", "formats", "lineEndings", "timeouts"])
    );
}
