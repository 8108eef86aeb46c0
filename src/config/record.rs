//! Persisted configuration record.
//!
//! Layout (little-endian, no padding):
//!
//! ```text
//! offset  size  field
//!      0     2  IR address
//!      2    12  6 x IR command code (Up, Down, Mute, Left, Right, Preset)
//!     14     1  volume
//!     15     1  balance (two's complement)
//!     16     2  checksum, directly after the record
//! ```

use crate::remote::{RemoteProfile, NUMBER_OF_COMMANDS};
use crate::volume::AudioSettings;

/// Size of the record image without checksum.
pub const RECORD_SIZE: usize = 2 + 2 * NUMBER_OF_COMMANDS + 2;

/// Size of the trailing checksum.
pub const CHECKSUM_SIZE: usize = 2;

/// Everything that survives a power cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigRecord {
    pub profile: RemoteProfile,
    /// Preset listening level.
    pub settings: AudioSettings,
}

impl ConfigRecord {
    pub const fn new(profile: RemoteProfile, settings: AudioSettings) -> Self {
        Self { profile, settings }
    }

    /// Byte image as stored.
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[0..2].copy_from_slice(&self.profile.address.to_le_bytes());
        for (i, code) in self.profile.codes.iter().enumerate() {
            let at = 2 + i * 2;
            buf[at..at + 2].copy_from_slice(&code.to_le_bytes());
        }
        buf[RECORD_SIZE - 2] = self.settings.volume;
        buf[RECORD_SIZE - 1] = self.settings.balance as u8;
        buf
    }

    /// Rebuild a record from its byte image. Values are taken as stored.
    pub fn from_bytes(buf: &[u8; RECORD_SIZE]) -> Self {
        let address = u16::from_le_bytes([buf[0], buf[1]]);
        let mut codes = [0u16; NUMBER_OF_COMMANDS];
        for (i, code) in codes.iter_mut().enumerate() {
            let at = 2 + i * 2;
            *code = u16::from_le_bytes([buf[at], buf[at + 1]]);
        }
        Self {
            profile: RemoteProfile::new(address, codes),
            settings: AudioSettings::new(buf[RECORD_SIZE - 2], buf[RECORD_SIZE - 1] as i8),
        }
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        checksum(&self.to_bytes())
    }

    /// Print the record to the console.
    pub fn log(&self) {
        self.profile.log();
        log::info!("  {:>8}: {:03}", "Volume", self.settings.volume);
        log::info!("  {:>8}: {:+03}", "Balance", self.settings.balance);
        log::info!("  {:>8}: {:04X}", "Checksum", self.checksum());
    }
}

/// Fletcher-16 style checksum: two running sums modulo 255,
/// `sum2` in the high byte and `sum1` in the low byte.
///
/// Modulo 255 makes `0x00` and `0xFF` indistinguishable at the same position.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum1: u16 = 0;
    let mut sum2: u16 = 0;
    for &b in data {
        sum1 = (sum1 + b as u16) % 0xFF;
        sum2 = (sum2 + sum1) % 0xFF;
    }
    (sum2 << 8) | sum1
}

/// Whether `stored` matches the checksum of `data`.
#[inline]
pub fn validate(data: &[u8], stored: u16) -> bool {
    checksum(data) == stored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigRecord {
        ConfigRecord::new(
            RemoteProfile::new(0xEE87, [0x0B, 0x0D, 0x5F, 0x08, 0x07, 0x5D]),
            AudioSettings::new(40, -5),
        )
    }

    #[test]
    fn test_record_size() {
        assert_eq!(RECORD_SIZE, 16);
    }

    #[test]
    fn test_byte_layout() {
        let bytes = sample().to_bytes();
        assert_eq!(&bytes[0..2], &[0x87, 0xEE]);
        assert_eq!(&bytes[2..4], &[0x0B, 0x00]);
        assert_eq!(bytes[14], 40);
        assert_eq!(bytes[15], 0xFB);
        assert_eq!(ConfigRecord::from_bytes(&bytes), sample());
    }

    #[test]
    fn test_checksum_known_values() {
        assert_eq!(checksum(&[]), 0);
        // sum1: 1, 3, 6  sum2: 1, 4, 10
        assert_eq!(checksum(&[1, 2, 3]), 0x0A06);
        // Fletcher-16 reference vector
        assert_eq!(checksum(b"abcde"), 0xC8F0);
    }

    #[test]
    fn test_erased_medium_does_not_validate() {
        let erased = [0xFFu8; RECORD_SIZE];
        assert!(!validate(&erased, 0xFFFF));
    }

    #[test]
    fn test_zero_and_ff_collide() {
        let mut data = [0x10u8; 8];
        let original = checksum(&data);
        data[3] = 0x00;
        let with_zero = checksum(&data);
        data[3] = 0xFF;
        assert_eq!(checksum(&data), with_zero);
        assert_ne!(with_zero, original);
    }
}
