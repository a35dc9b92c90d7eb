//! Adapters: concrete implementations of the [`SerialPort`] transport.
//!
//! | Adapter  | Implements | Connects to                          |
//! |----------|------------|--------------------------------------|
//! | `stream` | SerialPort | any `std::io::Read + Write` stream   |
//! | `uart`   | SerialPort | ESP-IDF UART peripheral (espidf only)|
//!
//! `device_id` reads the board's factory identity.
//!
//! [`SerialPort`]: crate::protocol::transport::SerialPort

pub mod device_id;
pub mod stream;
#[cfg(all(feature = "espidf", target_os = "espidf"))]
pub mod uart;
pub(super) mod utils;
