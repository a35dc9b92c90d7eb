//! ESP-IDF UART adapter.
//!
//! Implements [`SerialPort`] over an `esp_idf_hal` [`UartDriver`].  Unlike
//! the host stream adapter, every stream setting is applied to the
//! peripheral: baud rate, data bits, parity and stop bits.

use esp_idf_hal::delay::TickType;
use esp_idf_hal::uart::UartDriver;
use esp_idf_hal::uart::config::{DataBits, Parity as UartParity, StopBits};
use esp_idf_hal::units::Hertz;
use esp_idf_sys::EspError;
use log::info;

use crate::config::{Parity, StreamSettings};
use crate::protocol::transport::SerialPort;

use super::utils::LineCollector;

pub struct UartPort<'d> {
    driver: UartDriver<'d>,
    settings: StreamSettings,
}

impl<'d> UartPort<'d> {
    pub fn new(driver: UartDriver<'d>) -> Self {
        Self {
            driver,
            settings: StreamSettings::default(),
        }
    }

    fn write_all(&self, mut data: &[u8]) -> Result<(), EspError> {
        while !data.is_empty() {
            let n = self.driver.write(data)?;
            data = &data[n..];
        }
        Ok(())
    }
}

impl SerialPort for UartPort<'_> {
    type Error = EspError;

    fn configure(&mut self, settings: &StreamSettings) -> Result<(), EspError> {
        self.driver.change_baudrate(Hertz(settings.baud))?;
        self.driver.change_data_bits(match settings.format.data_bits() {
            7 => DataBits::DataBits7,
            _ => DataBits::DataBits8,
        })?;
        self.driver.change_parity(match settings.format.parity() {
            Parity::None => UartParity::ParityNone,
            Parity::Even => UartParity::ParityEven,
            Parity::Odd => UartParity::ParityOdd,
        })?;
        self.driver.change_stop_bits(match settings.format.stop_bits() {
            2 => StopBits::STOP2,
            _ => StopBits::STOP1,
        })?;
        info!(
            "UART: {} baud {}, line ending {}, timeout {} ms",
            settings.baud,
            settings.format.as_str(),
            settings.line_ending.as_str(),
            settings.timeout_ms
        );
        self.settings = *settings;
        Ok(())
    }

    fn write_read(&mut self, request: &[u8], response: &mut [u8]) -> Result<usize, EspError> {
        let terminator = self.settings.line_ending.bytes();

        // Drop anything the detector sent unprompted.
        self.driver.clear_rx()?;
        self.write_all(request)?;
        self.write_all(terminator)?;

        let deadline = std::time::Instant::now() + self.settings.timeout();
        let mut line = LineCollector::new(response, terminator);
        let mut byte = [0u8; 1];

        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                break;
            }
            let ticks = TickType::new_millis(remaining.as_millis() as u64).ticks();
            if self.driver.read(&mut byte, ticks)? == 0 {
                break;
            }
            if line.push(byte[0]) {
                break;
            }
        }

        Ok(line.finish())
    }
}
