//! Scripted serial port for integration tests.
//!
//! Records every request and every applied stream setting so tests can
//! assert on the exact wire traffic without a detector attached.

use std::collections::{HashMap, VecDeque};

use toydad_interface::config::StreamSettings;
use toydad_interface::protocol::transport::SerialPort;

// ── Scripted reply ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Scripted {
    /// Bytes returned for the next request.
    Line(Vec<u8>),
    /// Timeout: nothing received.
    Silence,
    /// Transport-level failure.
    LinkDown,
}

// ── MockPort ──────────────────────────────────────────────────

pub struct MockPort {
    /// Consumed first, one per request.
    pub script: VecDeque<Scripted>,
    /// Fallback answers by request key once the script is empty.
    pub answers: HashMap<Vec<u8>, Vec<u8>>,
    pub requests: Vec<Vec<u8>>,
    pub applied: Vec<StreamSettings>,
    pub reject_settings: bool,
}

#[allow(dead_code)]
impl MockPort {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            answers: HashMap::new(),
            requests: Vec::new(),
            applied: Vec::new(),
            reject_settings: false,
        }
    }

    /// A detector that answers every identity and status query.
    pub fn healthy() -> Self {
        let mut port = Self::new();
        port.answer("DTr", "DTrTOYDAD");
        port.answer("HWr", "HWrV2.1");
        port.answer("MDr", "MDrDAD-2.1L");
        port.answer("SWr", "SWr01.06");
        port.answer("SNr", "SNr17042");
        port.answer("STr", "STr2");
        port
    }

    pub fn answer(&mut self, key: &str, reply: &str) {
        self.answers
            .insert(key.as_bytes().to_vec(), reply.as_bytes().to_vec());
    }

    pub fn push(&mut self, reply: &[u8]) {
        self.script.push_back(Scripted::Line(reply.to_vec()));
    }

    pub fn push_silence(&mut self) {
        self.script.push_back(Scripted::Silence);
    }

    pub fn push_link_down(&mut self) {
        self.script.push_back(Scripted::LinkDown);
    }

    /// Trailing three bytes of each request, i.e. the command keys sent.
    pub fn keys_sent(&self) -> Vec<String> {
        self.requests
            .iter()
            .map(|r| String::from_utf8_lossy(&r[r.len().saturating_sub(3)..]).into_owned())
            .collect()
    }
}

impl Default for MockPort {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialPort for MockPort {
    type Error = &'static str;

    fn configure(&mut self, settings: &StreamSettings) -> Result<(), Self::Error> {
        if self.reject_settings {
            return Err("settings rejected");
        }
        self.applied.push(*settings);
        Ok(())
    }

    fn write_read(&mut self, request: &[u8], response: &mut [u8]) -> Result<usize, Self::Error> {
        self.requests.push(request.to_vec());

        let reply = match self.script.pop_front() {
            Some(Scripted::Line(bytes)) => bytes,
            Some(Scripted::Silence) => return Ok(0),
            Some(Scripted::LinkDown) => return Err("link down"),
            None => {
                let key = &request[request.len().saturating_sub(3)..];
                match self.answers.get(key) {
                    Some(bytes) => bytes.clone(),
                    None => return Ok(0),
                }
            }
        };

        let n = reply.len().min(response.len());
        response[..n].copy_from_slice(&reply[..n]);
        Ok(n)
    }
}
