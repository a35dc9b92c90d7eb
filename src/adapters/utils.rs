//! Shared utilities for the serial adapters.
//!
//! Both the host stream adapter and the ESP-IDF UART adapter read replies
//! one byte at a time; the line-assembly rules live here so that they
//! cannot drift apart.

/// Collects bytes into a caller-owned buffer until the line terminator
/// arrives or the buffer is full.
pub(super) struct LineCollector<'a> {
    buf: &'a mut [u8],
    len: usize,
    terminator: &'static [u8],
}

impl<'a> LineCollector<'a> {
    pub(super) fn new(buf: &'a mut [u8], terminator: &'static [u8]) -> Self {
        Self {
            buf,
            len: 0,
            terminator,
        }
    }

    /// Append one byte.  Returns `true` once the line is complete.
    pub(super) fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return true;
        }
        self.buf[self.len] = byte;
        self.len += 1;
        self.ends_with_terminator() || self.is_full()
    }

    pub(super) fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    fn ends_with_terminator(&self) -> bool {
        !self.terminator.is_empty() && self.buf[..self.len].ends_with(self.terminator)
    }

    /// Number of line bytes collected, terminator excluded.
    pub(super) fn finish(self) -> usize {
        if self.ends_with_terminator() {
            self.len - self.terminator.len()
        } else {
            self.len
        }
    }
}
