//! Transport abstraction: the serial link to the detector.
//!
//! Concrete implementations:
//! - [`StreamPort`](crate::adapters::stream::StreamPort) over any
//!   `std::io::Read + Write` stream (host serial devices, pipes)
//! - [`UartPort`](crate::adapters::uart) over an ESP-IDF UART driver
//!
//! The detector driver is generic over `SerialPort`, so adding a new
//! transport requires zero changes to the protocol logic.

use crate::config::StreamSettings;

/// Blocking, line-oriented duplex byte channel.
pub trait SerialPort {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Apply baud rate, frame format, line ending and timeout.
    /// Must be called once before the first [`write_read`](Self::write_read).
    fn configure(&mut self, settings: &StreamSettings) -> Result<(), Self::Error>;

    /// Write `request` followed by the configured line ending, then read
    /// into `response` until the line ending, a full buffer, or the timeout.
    ///
    /// Returns the number of response bytes (terminator excluded).
    /// `Ok(0)` means the timeout elapsed with nothing received.
    fn write_read(&mut self, request: &[u8], response: &mut [u8]) -> Result<usize, Self::Error>;
}

impl<P: SerialPort + ?Sized> SerialPort for &mut P {
    type Error = P::Error;

    fn configure(&mut self, settings: &StreamSettings) -> Result<(), Self::Error> {
        (**self).configure(settings)
    }

    fn write_read(&mut self, request: &[u8], response: &mut [u8]) -> Result<usize, Self::Error> {
        (**self).write_read(request, response)
    }
}

/// A port with nothing attached: accepts writes and never answers.
/// Every exchange over it behaves like a timeout.
pub struct NullPort;

impl SerialPort for NullPort {
    type Error = ();

    fn configure(&mut self, _settings: &StreamSettings) -> Result<(), ()> {
        Ok(())
    }

    fn write_read(&mut self, _request: &[u8], _response: &mut [u8]) -> Result<usize, ()> {
        Ok(0)
    }
}
