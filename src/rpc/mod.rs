//! Line-oriented JSON RPC subsystem.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        RPC Stack                          │
//! │                                                           │
//! │  console line ──▶ Engine (parse · dispatch) ──▶ Handlers  │
//! │       ▲                  │                        │       │
//! │       │                  ▼                        ▼       │
//! │  reply line ◀──── properties (serial)      Detector       │
//! │                                           (SerialPort)    │
//! └───────────────────────────────────────────────────────────┘
//! ```

pub mod engine;
pub mod handlers;
