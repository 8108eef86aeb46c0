//! Byte-addressable non-volatile storage.

/// Synchronous byte-range access to a non-volatile medium.
///
/// Device-level errors are reported, but silent corruption is only caught by
/// the record checksum in [`crate::config::store`].
pub trait Storage {
    type Error: core::fmt::Debug;

    /// Fill `buf` with the bytes starting at `offset`.
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `data` starting at `offset`.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error>;
}

/// Access outside the medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds {
    pub offset: usize,
    pub len: usize,
}

/// RAM-backed storage, erased to `0xFF` like a fresh EEPROM.
pub struct MemoryStorage<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> MemoryStorage<N> {
    /// Erased medium.
    pub const fn new() -> Self {
        Self { bytes: [0xFF; N] }
    }

    /// Medium with the given content.
    pub const fn with_bytes(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    /// Raw medium content.
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Mutable raw content, e.g. to simulate a damaged cell.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; N] {
        &mut self.bytes
    }

    fn range(offset: usize, len: usize) -> Result<core::ops::Range<usize>, OutOfBounds> {
        match offset.checked_add(len) {
            Some(end) if end <= N => Ok(offset..end),
            _ => Err(OutOfBounds { offset, len }),
        }
    }
}

impl<const N: usize> Default for MemoryStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Storage for MemoryStorage<N> {
    type Error = OutOfBounds;

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        let range = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error> {
        let range = Self::range(offset, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_memory_is_erased() {
        let mut mem = MemoryStorage::<8>::new();
        let mut buf = [0u8; 8];
        mem.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xFF; 8]);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut mem = MemoryStorage::<8>::new();
        assert_eq!(
            mem.write(6, &[1, 2, 3]),
            Err(OutOfBounds { offset: 6, len: 3 })
        );
        let mut buf = [0u8; 2];
        assert!(mem.read(6, &mut buf).is_ok());
    }
}
