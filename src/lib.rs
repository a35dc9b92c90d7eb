//! TOYDAD detector interface firmware library.
//!
//! Exposes the protocol, driver and RPC modules for integration testing
//! and host-side use. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]`.

#![deny(unused_must_use)]

pub mod adapters;
pub mod config;
pub mod detector;
pub mod error;
pub mod protocol;
pub mod rpc;
