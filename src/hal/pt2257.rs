//! PT2257 two-channel electronic volume driver.
//!
//! I2C write-only control. Each channel gets a 10 dB and a 1 dB step command.
//! Reference: PT2257 datasheet

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

/// PT2257 I2C address (0x88 in the datasheet's 8-bit notation).
pub const PT2257_ADDR: u8 = 0x44;

/// Highest attenuation in dB, also the lowest volume level.
pub const MAX_ATTENUATION_DB: u8 = 79;

/// PT2257 command bits
mod cmd {
    pub const LEFT: u8 = 0b1000_0000;
    pub const RIGHT: u8 = 0b0000_0000;
    pub const STEP_1DB: u8 = 0b0010_0000;
    pub const STEP_10DB: u8 = 0b0011_0000;
}

/// Output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    pub const BOTH: [Channel; 2] = [Channel::Left, Channel::Right];

    #[inline]
    fn bits(self) -> u8 {
        match self {
            Channel::Left => cmd::LEFT,
            Channel::Right => cmd::RIGHT,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::Left => "L",
            Channel::Right => "R",
        }
    }
}

/// PT2257 driver error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pt2257Error {
    /// I2C transmission failed
    Bus(ErrorKind),
}

impl core::fmt::Display for Pt2257Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Pt2257Error::Bus(kind) => write!(f, "I2C error: {}", kind),
        }
    }
}

/// Command bytes for one channel: tens digit first, then units.
///
/// Attenuation is clamped to [`MAX_ATTENUATION_DB`].
pub fn channel_commands(channel: Channel, attenuation_db: u8) -> [u8; 2] {
    let db = attenuation_db.min(MAX_ATTENUATION_DB);
    [
        channel.bits() | cmd::STEP_10DB | (db / 10),
        channel.bits() | cmd::STEP_1DB | (db % 10),
    ]
}

/// PT2257 driver.
///
/// Holds the bus; the chip has no readable registers, so nothing is cached.
pub struct Pt2257<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Pt2257<I2C> {
    /// Driver at the default address.
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, PT2257_ADDR)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Send one channel's attenuation as a single two-byte transaction.
    pub fn set_attenuation(&mut self, channel: Channel, attenuation_db: u8) -> Result<(), Pt2257Error> {
        let bytes = channel_commands(channel, attenuation_db);
        log::debug!(
            "  {}: -{} dB  x10: {:08b}  x1: {:08b}",
            channel.label(),
            attenuation_db.min(MAX_ATTENUATION_DB),
            bytes[0],
            bytes[1]
        );
        self.i2c
            .write(self.address, &bytes)
            .map_err(|e| Pt2257Error::Bus(e.kind()))
    }

    /// Borrow the bus, e.g. for inspection in tests.
    pub fn bus(&self) -> &I2C {
        &self.i2c
    }

    pub fn bus_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Release the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}
