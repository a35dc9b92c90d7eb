//! Serial port adapter over any `std::io` byte stream.
//!
//! Implements [`SerialPort`] for host-side serial devices, pipes and
//! sockets.  Baud rate and frame format belong to whoever opened the
//! stream; this adapter only applies the line ending and the timeout.
//!
//! Bytes already waiting in the stream when a request goes out are read
//! and discarded first, so a reply that arrived after its own timeout can
//! never be taken for the answer to the next request.
//!
//! Streams opened with their own read timeout should return
//! `WouldBlock` or `TimedOut` when idle.  A stream that blocks forever in
//! `read` will also block `write_read` forever.

use std::io::{self, ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use log::debug;

use crate::config::StreamSettings;
use crate::protocol::transport::SerialPort;

use super::utils::LineCollector;

/// Back-off between polls of an idle non-blocking stream.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

pub struct StreamPort<S> {
    stream: S,
    settings: StreamSettings,
}

impl<S: Read + Write> StreamPort<S> {
    /// Wrap `stream`; defaults apply until [`SerialPort::configure`].
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            settings: StreamSettings::default(),
        }
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Read and drop everything already buffered, up to the first idle
    /// read or end of stream.
    fn discard_pending(&mut self) -> io::Result<()> {
        let mut scratch = [0u8; 64];
        let mut dropped = 0usize;
        loop {
            match self.stream.read(&mut scratch) {
                Ok(0) => break,
                Ok(n) => dropped += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
                Err(e) => return Err(e),
            }
        }
        if dropped > 0 {
            debug!("stream: discarded {} stale bytes", dropped);
        }
        Ok(())
    }
}

impl<S: Read + Write> SerialPort for StreamPort<S> {
    type Error = io::Error;

    fn configure(&mut self, settings: &StreamSettings) -> io::Result<()> {
        debug!(
            "stream: {} baud {} (not applied), line ending {}, timeout {} ms",
            settings.baud,
            settings.format.as_str(),
            settings.line_ending.as_str(),
            settings.timeout_ms
        );
        self.settings = *settings;
        Ok(())
    }

    fn write_read(&mut self, request: &[u8], response: &mut [u8]) -> io::Result<usize> {
        let terminator = self.settings.line_ending.bytes();
        self.discard_pending()?;
        self.stream.write_all(request)?;
        self.stream.write_all(terminator)?;
        self.stream.flush()?;

        let deadline = Instant::now() + self.settings.timeout();
        let mut line = LineCollector::new(response, terminator);
        let mut byte = [0u8; 1];

        while !line.is_full() {
            match self.stream.read(&mut byte) {
                // End of stream: nothing more will arrive.
                Ok(0) => break,
                Ok(_) => {
                    if line.push(byte[0]) {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    if Instant::now() >= deadline {
                        break;
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                break;
            }
        }

        Ok(line.finish())
    }
}
