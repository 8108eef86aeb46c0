//! Host doubles for the hardware seams.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::i2c::{self, ErrorKind, I2c, NoAcknowledgeSource, Operation};

use ir_volume_remote::hal::{IrDecoder, IrFrame, MemoryStorage, Storage};
use ir_volume_remote::{RemoteProfile, SemanticCommand};

pub const REMOTE_ADDR: u16 = 0x00EE;
pub const CODES: [u16; 6] = [0x10, 0x11, 0x12, 0x13, 0x14, 0x15];

pub fn profile() -> RemoteProfile {
    RemoteProfile::new(REMOTE_ADDR, CODES)
}

pub fn code(command: SemanticCommand) -> u16 {
    CODES[command as usize]
}

pub fn press(command: SemanticCommand) -> IrFrame {
    IrFrame::press(REMOTE_ADDR, code(command))
}

pub fn repeat(command: SemanticCommand) -> IrFrame {
    IrFrame::repeat(REMOTE_ADDR, code(command))
}

/// Records every I2C write; can be told to fail.
#[derive(Debug, Default)]
pub struct MockI2c {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub fail: bool,
}

impl MockI2c {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            writes: Vec::new(),
            fail: true,
        }
    }
}

impl i2c::ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                Operation::Read(buf) => buf.fill(0),
            }
        }
        Ok(())
    }
}

/// Output pin whose level can be watched from the test.
#[derive(Debug, Clone, Default)]
pub struct MockPin {
    level: Rc<Cell<bool>>,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.level.get()
    }
}

impl digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.level.set(true);
        Ok(())
    }
}

/// Decoder fed by the test.
#[derive(Debug, Default)]
pub struct ScriptedDecoder {
    frames: VecDeque<IrFrame>,
}

impl ScriptedDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: IrFrame) {
        self.frames.push_back(frame);
    }

    pub fn pending(&self) -> usize {
        self.frames.len()
    }
}

impl IrDecoder for ScriptedDecoder {
    fn poll(&mut self) -> Option<IrFrame> {
        self.frames.pop_front()
    }
}

pub type Eeprom = MemoryStorage<64>;

/// Accepts writes but never keeps them, like a worn-out cell.
#[derive(Default)]
pub struct WriteLostStorage {
    inner: Eeprom,
}

impl Storage for WriteLostStorage {
    type Error = <Eeprom as Storage>::Error;

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.inner.read(offset, buf)
    }

    fn write(&mut self, _offset: usize, _data: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }
}
