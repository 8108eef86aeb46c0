//! Checksum-protected persistence of the [`ConfigRecord`].
//!
//! Write order is record first, checksum last. A power loss in between leaves
//! a checksum that no longer matches, so the next restore reports it instead
//! of loading half a record.

use super::record::{checksum, ConfigRecord, CHECKSUM_SIZE, RECORD_SIZE};
use crate::hal::storage::Storage;

/// Persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The storage device reported an error.
    Device,
    /// Stored checksum does not match the record (first run or corruption).
    ChecksumMismatch { stored: u16, computed: u16 },
    /// Read-back after a store did not return the written record.
    VerifyFailed,
}

impl StoreError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Device => "S01",
            Self::ChecksumMismatch { .. } => "S02",
            Self::VerifyFailed => "S03",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Device => "storage device error",
            Self::ChecksumMismatch { .. } => "invalid checksum",
            Self::VerifyFailed => "verification after store failed",
        }
    }
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ChecksumMismatch { stored, computed } => write!(
                f,
                "{}: {} (stored {:04X}, computed {:04X})",
                self.code(),
                self.message(),
                stored,
                computed
            ),
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}

/// Reads and writes the record at a fixed storage offset.
pub struct PersistentStore<S> {
    storage: S,
    offset: usize,
}

impl<S: Storage> PersistentStore<S> {
    pub fn new(storage: S, offset: usize) -> Self {
        Self { storage, offset }
    }

    /// Load the record and check it against the stored checksum.
    pub fn restore(&mut self) -> Result<ConfigRecord, StoreError> {
        log::info!("Restore config");
        let record = self.read_validated()?;
        record.log();
        Ok(record)
    }

    /// Write the record, then its checksum, then read both back.
    ///
    /// Success means the record was confirmed on the medium. No retries.
    pub fn store(&mut self, record: &ConfigRecord) -> Result<(), StoreError> {
        log::info!("Store config");
        let bytes = record.to_bytes();
        let sum = checksum(&bytes);
        self.write(self.offset, &bytes)?;
        self.write(self.offset + RECORD_SIZE, &sum.to_le_bytes())?;

        match self.read_validated() {
            Ok(stored) if stored == *record => {
                stored.log();
                Ok(())
            }
            Ok(_) | Err(StoreError::ChecksumMismatch { .. }) => {
                log::error!("{}", StoreError::VerifyFailed);
                Err(StoreError::VerifyFailed)
            }
            Err(e) => Err(e),
        }
    }

    /// Borrow the device, e.g. for inspection in tests.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn read_validated(&mut self) -> Result<ConfigRecord, StoreError> {
        let mut bytes = [0u8; RECORD_SIZE];
        let mut sum = [0u8; CHECKSUM_SIZE];
        self.read(self.offset, &mut bytes)?;
        self.read(self.offset + RECORD_SIZE, &mut sum)?;

        let stored = u16::from_le_bytes(sum);
        let computed = checksum(&bytes);
        if stored != computed {
            let err = StoreError::ChecksumMismatch { stored, computed };
            log::warn!("{}", err);
            return Err(err);
        }
        Ok(ConfigRecord::from_bytes(&bytes))
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        self.storage.read(offset, buf).map_err(|e| {
            log::error!("Storage read at {}: {:?}", offset, e);
            StoreError::Device
        })
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError> {
        self.storage.write(offset, data).map_err(|e| {
            log::error!("Storage write at {}: {:?}", offset, e);
            StoreError::Device
        })
    }
}
