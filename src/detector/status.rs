//! Detector operating status reported by the `STr` command.

use log::trace;

use crate::error::DetectorError;

/// Width of the status field inside an `STr` payload.
pub const STATUS_SIZE: usize = 2;
/// Offset of the status field inside an `STr` payload.
pub const STATUS_OFFSET: usize = 0;

/// Operating mode at the moment of the query.  Ordinals are the wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    Standby = 0,
    LampIgnition = 1,
    Measurement = 2,
    Autozero = 3,
    ScanAbs = 4,
    ScanIts = 5,
    UserCalib = 6,
    SelfTest = 7,
    ScanAbsSubs = 8,
}

impl Status {
    pub const COUNT: usize = 9;

    /// Every status, in ordinal order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Standby,
        Self::LampIgnition,
        Self::Measurement,
        Self::Autozero,
        Self::ScanAbs,
        Self::ScanIts,
        Self::UserCalib,
        Self::SelfTest,
        Self::ScanAbsSubs,
    ];

    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable label.  The `match` has no wildcard arm, so a new
    /// variant will not compile until it is given a label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standby => "Standby",
            Self::LampIgnition => "Lamp ignition",
            Self::Measurement => "Measurement",
            Self::Autozero => "Autozero",
            Self::ScanAbs => "Absorbance scan",
            Self::ScanIts => "Intensity scan",
            Self::UserCalib => "User calibration",
            Self::SelfTest => "Self test",
            Self::ScanAbsSubs => "Absorbance scan with subtraction",
        }
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Decode an `STr` payload.
///
/// The status field is sliced out at `STATUS_OFFSET`, but the code itself
/// is parsed from the start of the whole payload.  The field is only
/// traced until the device's wire layout is confirmed.
pub fn decode_status(payload: &[u8]) -> Result<Status, DetectorError> {
    let field = payload
        .get(STATUS_OFFSET..)
        .map_or(&[][..], |rest| &rest[..rest.len().min(STATUS_SIZE)]);
    trace!("status field {:?}", String::from_utf8_lossy(field));

    let code = parse_leading_int(payload);
    Status::from_code(code).ok_or(DetectorError::UnknownStatus(code))
}

/// Leading-integer parse with C `atoi` rules: skip ASCII whitespace,
/// optional sign, then digits up to the first non-digit.  No digits
/// yields 0; overflow saturates.
pub fn parse_leading_int(bytes: &[u8]) -> i32 {
    let trimmed = bytes.trim_ascii_start();
    let (negative, digits) = match trimmed {
        [b'-', tail @ ..] => (true, tail),
        [b'+', tail @ ..] => (false, tail),
        _ => (false, trimmed),
    };

    let mut value: i32 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        let digit = i32::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}
