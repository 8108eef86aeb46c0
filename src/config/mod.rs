//! Module: config
//!
//! Purpose: Controller settings and the persisted configuration record.
//!
//! Architecture:
//! - `ControllerConfig`: wiring and timing chosen at build time
//! - `record`: byte image and checksum of the persisted record
//! - `store`: checksum-protected read/write on a [`crate::hal::Storage`]

pub mod record;
pub mod store;

pub use record::{checksum, validate, ConfigRecord, CHECKSUM_SIZE, RECORD_SIZE};
pub use store::{PersistentStore, StoreError};

use crate::hal::pt2257::PT2257_ADDR;

/// Minimum gap between two accepted IR frames. Rejects runaway repeats.
pub const DEBOUNCE_MS: u64 = 130;

/// Silence after the last Preset frame that counts as a release.
pub const RELEASE_DETECT_MS: u64 = 500;

/// Preset presses shorter than this recall the preset.
pub const SHORT_PRESS_MS: u64 = 1000;

/// Preset presses longer than this save the preset.
pub const LONG_PRESS_MS: u64 = 3000;

/// How long a valid configuration can be replaced by learning a new remote.
pub const RELEARN_WINDOW_MS: u64 = 5000;

/// The very first EEPROM byte may be damaged; the record starts after it.
pub const STORAGE_OFFSET: usize = 1;

/// Wiring dependent settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Change it in case the balance shifts into the opposite direction.
    pub swap_left_right: bool,
    /// 7-bit I2C address of the attenuator.
    pub attenuator_address: u8,
    /// Storage offset of the configuration record.
    pub storage_offset: usize,
    /// Startup window for relearning a remote.
    pub relearn_window_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            swap_left_right: true,
            attenuator_address: PT2257_ADDR,
            storage_offset: STORAGE_OFFSET,
            relearn_window_ms: RELEARN_WINDOW_MS,
        }
    }
}
