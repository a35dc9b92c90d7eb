//! Fuzz target: `parse_response` + `decode_status`
//!
//! Treats arbitrary bytes as a detector reply and checks that matching,
//! payload extraction and status decoding never panic and never hand
//! back a payload longer than the reply.
//!
//! cargo fuzz run fuzz_parse_response

#![no_main]

use libfuzzer_sys::fuzz_target;
use toydad_interface::detector::status::decode_status;
use toydad_interface::protocol::codec::{RESPONSE_SIZE_MAX, Response, parse_response};
use toydad_interface::protocol::key::CommandKey;

const KEYS: [CommandKey; 6] = [
    CommandKey::DETECTOR_NAME,
    CommandKey::HARDWARE_VERSION,
    CommandKey::MODEL,
    CommandKey::FIRMWARE_VERSION,
    CommandKey::SERIAL_NUMBER,
    CommandKey::STATUS,
];

fuzz_target!(|data: &[u8]| {
    let response = Response::from_slice(data);
    assert!(response.len() <= RESPONSE_SIZE_MAX);

    for key in KEYS {
        if let Ok(payload) = parse_response(response.as_bytes(), key) {
            assert!(payload.len() + CommandKey::SIZE <= response.len());
            assert_eq!(payload, response.payload());
            if key == CommandKey::STATUS {
                let _ = decode_status(payload);
            }
        }
    }
});
