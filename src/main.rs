//! TOYDAD Interface Firmware: Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  USB console (stdin/stdout)                                  │
//! │        │ one JSON request per line                           │
//! │        ▼                                                     │
//! │  RpcServer ──▶ handlers ──▶ Detector ──▶ UartPort ──▶ UART1  │
//! │        │                                          (detector) │
//! │        ▼ one JSON reply per line                             │
//! │  USB console                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::{self, BufRead, ErrorKind, Write};
use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use toydad_interface::adapters::device_id;
use toydad_interface::adapters::uart::UartPort;
use toydad_interface::config::{FIRMWARE_NAME, FIRMWARE_VERSION, InterfaceConfig};
use toydad_interface::rpc::engine::RpcServer;

/// Idle back-off while the console has no input.
const CONSOLE_POLL: Duration = Duration::from_millis(10);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("{} v{}", FIRMWARE_NAME, FIRMWARE_VERSION);

    // ── 2. Configuration (defaults, nothing persisted) ────────
    let config = InterfaceConfig::default();
    config.validate()?;
    let settings = config.detector_stream()?;

    // ── 3. Detector UART (stream 1: TX GPIO17, RX GPIO18) ─────
    let peripherals = Peripherals::take()?;
    let driver = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(settings.baud)),
    )?;

    // ── 4. RPC server ─────────────────────────────────────────
    let mut server = RpcServer::new(UartPort::new(driver), config)?;
    let serial_number = device_id::serial_number(&device_id::read_mac());
    server.set_serial_number(serial_number);
    info!("Serial number {}. Ready for requests.", serial_number);

    if server.detector_mut().communicating() {
        info!("Detector answering on stream {}", server.config().detector.stream);
    } else {
        warn!("Detector not answering yet");
    }

    // ── 5. Request loop ───────────────────────────────────────
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        // A non-blocking console may hand over a line in pieces; keep
        // accumulating until the newline arrives.
        match stdin.lock().read_line(&mut line) {
            Ok(0) => std::thread::sleep(CONSOLE_POLL),
            Ok(_) if !line.ends_with('\n') => {}
            Ok(_) => {
                if let Some(reply) = server.handle_line(&line) {
                    writeln!(stdout, "{reply}")?;
                    stdout.flush()?;
                }
                line.clear();
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                std::thread::sleep(CONSOLE_POLL);
            }
            Err(e) => {
                warn!("console read failed: {}", e);
                line.clear();
                std::thread::sleep(CONSOLE_POLL);
            }
        }
    }
}
