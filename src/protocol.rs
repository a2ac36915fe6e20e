//! Wire contract with the dispenser microcontroller.
//!
//! The protocol is a minimal poll loop, not a framed protocol:
//!
//! ```text
//!   host ──[ code: 1..=4 ]──▶ MCU          (one-byte write)
//!   host ◀──[ 0xAA | other ]── MCU         (one-byte read, repeated)
//! ```
//!
//! Any byte other than [`ACK_BYTE`] means "not yet".  There is no NACK,
//! checksum, or length prefix.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default 7-bit I2C address of the dispenser MCU.
pub const DEFAULT_DEVICE_ADDRESS: u8 = 0x08;

/// Default Linux I2C bus (`/dev/i2c-1` on a Raspberry Pi).
pub const DEFAULT_BUS_INDEX: u8 = 1;

/// Sentinel the MCU returns once the candy has physically dropped.
pub const ACK_BYTE: u8 = 0xAA;

/// One of the four candy chutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CandySelection {
    Circle = 1,
    Triangle = 2,
    Square = 3,
    Star = 4,
}

impl CandySelection {
    pub const ALL: [Self; 4] = [Self::Circle, Self::Triangle, Self::Square, Self::Star];

    /// Map an inbound token to a selection.  Matching is exact.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "circle" => Some(Self::Circle),
            "triangle" => Some(Self::Triangle),
            "square" => Some(Self::Square),
            "star" => Some(Self::Star),
            _ => None,
        }
    }

    /// Byte written to the MCU.
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn token(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Triangle => "triangle",
            Self::Square => "square",
            Self::Star => "star",
        }
    }
}

impl fmt::Display for CandySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Returned when a token names no candy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCandy(pub String);

impl fmt::Display for UnknownCandy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown candy type {:?}", self.0)
    }
}

impl std::error::Error for UnknownCandy {}

impl FromStr for CandySelection {
    type Err = UnknownCandy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| UnknownCandy(s.to_string()))
    }
}

/// Whether a polled byte completes the handshake.
pub const fn is_ack(byte: u8) -> bool {
    byte == ACK_BYTE
}
