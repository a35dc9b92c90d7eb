//! Detector serial protocol.
//!
//! ```text
//! ┌────────────┐   ┌───────────────┐   ┌────────────────────┐
//! │  Detector  │──▶│     Codec     │──▶│ SerialPort (trait) │
//! │  (driver)  │◀──│ key · payload │◀──│ write_read         │
//! └────────────┘   └───────────────┘   └────────────────────┘
//! ```
//!
//! Strictly one request in flight: the driver sends a line-beginning
//! marker plus a 3-character key, then blocks until the transport
//! returns the reply line (or its timeout fires).

pub mod codec;
pub mod key;
pub mod transport;
