//! Integration tests for the Detector → codec → SerialPort round trip.

use toydad_interface::config::{InterfaceConfig, LineEnding, SerialConfig};
use toydad_interface::detector::{Detector, DetectorInfo, Status};
use toydad_interface::error::{DetectorError, ProtocolError};
use toydad_interface::protocol::key::CommandKey;

use crate::mock_port::MockPort;

fn detector(port: MockPort) -> Detector<MockPort> {
    Detector::new(port, &InterfaceConfig::default()).expect("default config is valid")
}

// ── Identity accessors ────────────────────────────────────────

#[test]
fn hardware_version_round_trip() {
    let mut port = MockPort::new();
    port.push(b"HWrV2.1");
    let mut d = detector(port);

    assert_eq!(d.hardware_version(), Ok("V2.1".to_string()));
    assert_eq!(d.port().requests, vec![b"\rHWr".to_vec()]);
}

#[test]
fn mismatched_key_leaves_caller_output_untouched() {
    let mut port = MockPort::new();
    port.push(b"XXrV2.1");
    let mut d = detector(port);

    let mut version = String::from("unchanged");
    let result = d.hardware_version();
    if let Ok(v) = &result {
        version.clone_from(v);
    }

    assert!(result.unwrap_err().is_key_mismatch());
    assert_eq!(version, "unchanged");
}

#[test]
fn every_accessor_sends_its_own_key() {
    let mut d = detector(MockPort::healthy());

    assert_eq!(d.detector_name().unwrap(), "TOYDAD");
    assert_eq!(d.hardware_version().unwrap(), "V2.1");
    assert_eq!(d.model().unwrap(), "DAD-2.1L");
    assert_eq!(d.firmware_version().unwrap(), "01.06");
    assert_eq!(d.serial_number().unwrap(), "17042");
    assert_eq!(d.status().unwrap(), Status::Measurement);

    assert_eq!(d.port().keys_sent(), ["DTr", "HWr", "MDr", "SWr", "SNr", "STr"]);
}

#[test]
fn custom_line_beginning_prefixes_requests() {
    let mut config = InterfaceConfig::default();
    config.detector.line_beginning = "#!".to_string();
    let mut d = Detector::new(MockPort::healthy(), &config).unwrap();

    d.model().unwrap();
    assert_eq!(d.port().requests, vec![b"#!MDr".to_vec()]);
}

// ── Failure kinds ─────────────────────────────────────────────

#[test]
fn silence_is_a_timeout() {
    let mut port = MockPort::new();
    port.push_silence();
    let mut d = detector(port);

    let err = d.serial_number().unwrap_err();
    assert!(err.is_timeout());
}

#[test]
fn transport_failure_is_a_timeout() {
    let mut port = MockPort::new();
    port.push_link_down();
    let mut d = detector(port);

    assert_eq!(
        d.firmware_version(),
        Err(DetectorError::Protocol(ProtocolError::NoResponse))
    );
}

#[test]
fn empty_reply_after_match_does_not_reuse_old_key() {
    let mut port = MockPort::new();
    port.push(b"DTrTOYDAD");
    port.push(b"");
    let mut d = detector(port);

    assert!(d.detector_name().is_ok());
    assert!(d.detector_name().unwrap_err().is_timeout());
}

#[test]
fn truncated_key_is_not_a_match() {
    let mut port = MockPort::new();
    port.push(b"DT");
    let mut d = detector(port);

    assert!(d.detector_name().is_err());
}

// ── Liveness ──────────────────────────────────────────────────

#[test]
fn communicating_is_a_real_round_trip_each_time() {
    let mut port = MockPort::new();
    port.push(b"DTrTOYDAD");
    port.push_silence();
    let mut d = detector(port);

    assert!(d.communicating());
    assert!(!d.communicating());
    assert_eq!(d.port().keys_sent(), ["DTr", "DTr"]);
}

// ── Status ────────────────────────────────────────────────────

#[test]
fn status_codes_map_through_ordinals() {
    let cases: [(&[u8], Status); 4] = [
        (b"STr0", Status::Standby),
        (b"STr4", Status::ScanAbs),
        (b"STr8", Status::ScanAbsSubs),
        (b"STr1,0042", Status::LampIgnition),
    ];
    for (reply, expected) in cases {
        let mut port = MockPort::new();
        port.push(reply);
        let mut d = detector(port);
        assert_eq!(d.status(), Ok(expected), "reply {:?}", String::from_utf8_lossy(reply));
    }
}

#[test]
fn out_of_range_status_is_reported() {
    let mut port = MockPort::new();
    port.push(b"STr12");
    let mut d = detector(port);

    assert_eq!(d.status(), Err(DetectorError::UnknownStatus(12)));
}

#[test]
fn status_with_wrong_key_fails() {
    let mut port = MockPort::new();
    port.push(b"DTr4");
    let mut d = detector(port);

    assert!(d.status().unwrap_err().is_key_mismatch());
}

// ── Composite info ────────────────────────────────────────────

#[test]
fn info_reads_all_five_fields_in_order() {
    let mut d = detector(MockPort::healthy());

    let info = d.info().unwrap();
    assert_eq!(
        info,
        DetectorInfo {
            detector_name: "TOYDAD".into(),
            hardware_version: "V2.1".into(),
            model: "DAD-2.1L".into(),
            firmware_version: "01.06".into(),
            serial_number: "17042".into(),
        }
    );
    assert_eq!(d.port().keys_sent(), ["DTr", "HWr", "MDr", "SWr", "SNr"]);
}

#[test]
fn info_stops_at_first_failure() {
    let mut port = MockPort::healthy();
    port.push(b"DTrTOYDAD");
    port.push(b"HWrV2.1");
    port.push_silence();
    let mut d = detector(port);

    assert!(d.info().unwrap_err().is_timeout());
    assert_eq!(d.port().keys_sent(), ["DTr", "HWr", "MDr"]);
}

// ── Raw query ─────────────────────────────────────────────────

#[test]
fn raw_query_exposes_full_response() {
    let mut port = MockPort::new();
    port.push(b"SNr17042\0pad");
    let mut d = detector(port);

    let response = d.query(CommandKey::SERIAL_NUMBER).unwrap();
    assert_eq!(response.key(), Some(&b"SNr"[..]));
    assert_eq!(response.payload(), b"17042");
    assert_eq!(response.as_bytes(), b"SNr17042\0pad");
}

// ── Port configuration ────────────────────────────────────────

#[test]
fn construction_applies_detector_stream_settings() {
    let mut config = InterfaceConfig::default();
    config.serial = SerialConfig {
        bauds: [9600, 38400],
        line_endings: [LineEnding::Cr, LineEnding::CrLf],
        ..SerialConfig::default()
    };
    config.detector.stream = 1;

    let d = Detector::new(MockPort::new(), &config).unwrap();
    let applied = &d.port().applied;
    assert_eq!(applied.len(), 1);
    assert_eq!(applied[0].baud, 38400);
    assert_eq!(applied[0].line_ending, LineEnding::CrLf);
}

#[test]
fn rejected_settings_fail_construction() {
    let mut port = MockPort::new();
    port.reject_settings = true;
    assert!(matches!(
        Detector::new(port, &InterfaceConfig::default()),
        Err(DetectorError::PortSetup)
    ));
}
