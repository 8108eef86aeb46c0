//! Hardware Abstraction Layer for IrVolumeRemote.
//!
//! Thin seams around the peripherals the controller talks to.
//! Business logic stays in core modules, HAL is just I/O.

pub mod ir;
pub mod led;
pub mod pt2257;
pub mod storage;

pub use ir::{IrDecoder, IrFlags, IrFrame};
pub use led::{BlinkPattern, Indicators, Led};
pub use pt2257::{Pt2257, Pt2257Error, PT2257_ADDR};
pub use storage::{MemoryStorage, Storage};
