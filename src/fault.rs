//! Hardware fault bookkeeping for IrVolumeRemote.
//!
//! Nothing here stops the controller: a failed bus write self-heals on the
//! next volume change and a failed store is retried by learning again.
//! Faults are counted so repeated failures show up on the console.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Fault codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault (normal operation).
    None = 0,

    /// I2C transmission to the attenuator failed.
    /// The chip may keep a stale level until the next update.
    BusTransmit = 1,

    /// A stored record did not validate when read back.
    StorageVerify = 2,

    /// The storage device reported an error.
    StorageDevice = 3,
}

impl FaultCode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::BusTransmit,
            2 => FaultCode::StorageVerify,
            3 => FaultCode::StorageDevice,
            _ => FaultCode::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaultCode::None => "none",
            FaultCode::BusTransmit => "bus transmit",
            FaultCode::StorageVerify => "storage verify",
            FaultCode::StorageDevice => "storage device",
        }
    }
}

/// Latest fault plus running counters.
///
/// Atomics keep it usable from a `static` without locks.
pub struct FaultState {
    /// True if the latest fault has not been cleared.
    active: AtomicBool,

    /// Latest fault code.
    code: AtomicU8,

    /// Bus failures since boot.
    bus_errors: AtomicU32,

    /// Storage failures (verify + device) since boot.
    storage_errors: AtomicU32,
}

impl FaultState {
    /// Create new fault state (no fault).
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            code: AtomicU8::new(0),
            bus_errors: AtomicU32::new(0),
            storage_errors: AtomicU32::new(0),
        }
    }

    /// Record a fault.
    #[inline]
    pub fn set(&self, code: FaultCode) {
        match code {
            FaultCode::None => return,
            FaultCode::BusTransmit => {
                self.bus_errors.fetch_add(1, Ordering::Relaxed);
            }
            FaultCode::StorageVerify | FaultCode::StorageDevice => {
                self.storage_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.code.store(code as u8, Ordering::Release);
        self.active.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Latest fault code (only meaningful if `is_active()` is true).
    #[inline]
    pub fn code(&self) -> FaultCode {
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    #[inline]
    pub fn bus_errors(&self) -> u32 {
        self.bus_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn storage_errors(&self) -> u32 {
        self.storage_errors.load(Ordering::Relaxed)
    }

    /// Clear the active flag. Counters are kept for diagnostics.
    #[inline]
    pub fn clear(&self) {
        self.active.store(false, Ordering::Release);
    }

    #[inline]
    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            active: self.is_active(),
            code: self.code(),
            bus_errors: self.bus_errors(),
            storage_errors: self.storage_errors(),
        }
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of fault state at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaultSnapshot {
    pub active: bool,
    pub code: FaultCode,
    pub bus_errors: u32,
    pub storage_errors: u32,
}
