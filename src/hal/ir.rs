//! Decoded infrared frames.
//!
//! The protocol decoder itself lives outside this crate; it only has to
//! hand over one frame per poll.

/// Frame flags reported by the decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrFlags {
    /// Frame is an auto-repeat of a held button.
    pub repetition: bool,
    /// Button release was detected.
    pub release: bool,
}

/// One decoded IR frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrFrame {
    /// Transmitter address.
    pub address: u16,
    /// Command code, meaningful only together with `address`.
    pub command: u16,
    pub flags: IrFlags,
}

impl IrFrame {
    /// Frame produced by a fresh button press.
    pub const fn press(address: u16, command: u16) -> Self {
        Self {
            address,
            command,
            flags: IrFlags {
                repetition: false,
                release: false,
            },
        }
    }

    /// Auto-repeat frame of a held button.
    pub const fn repeat(address: u16, command: u16) -> Self {
        Self {
            address,
            command,
            flags: IrFlags {
                repetition: true,
                release: false,
            },
        }
    }

    #[inline]
    pub fn is_repetition(&self) -> bool {
        self.flags.repetition
    }
}

/// Non-blocking source of decoded frames.
pub trait IrDecoder {
    /// Take the next decoded frame, if any.
    fn poll(&mut self) -> Option<IrFrame>;
}

impl<T: IrDecoder + ?Sized> IrDecoder for &mut T {
    fn poll(&mut self) -> Option<IrFrame> {
        (**self).poll()
    }
}
