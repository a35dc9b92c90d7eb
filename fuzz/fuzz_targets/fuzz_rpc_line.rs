//! Fuzz target: `RpcServer::handle_line`
//!
//! Feeds arbitrary console input to the RPC server with no detector
//! attached.  Every non-blank line must produce exactly one reply that is
//! itself valid JSON.
//!
//! cargo fuzz run fuzz_rpc_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use toydad_interface::config::InterfaceConfig;
use toydad_interface::protocol::transport::NullPort;
use toydad_interface::rpc::engine::RpcServer;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(mut server) = RpcServer::new(NullPort, InterfaceConfig::default()) else {
        return;
    };

    match server.handle_line(line) {
        Some(reply) => {
            assert!(serde_json::from_str::<serde_json::Value>(&reply).is_ok());
        }
        None => assert!(line.trim().is_empty()),
    }
});
