//! # IrVolumeRemote
//!
//! Infrared learning volume remote for a PT2257 stereo attenuator.
//!
//! ## Architecture
//!
//! One cooperative loop calls [`App::tick`]. Nothing blocks:
//! - [`learning`]: captures the codes of a new remote, slot by slot
//! - [`command_loop`]: debounces frames, dispatches commands, times the Preset button
//! - [`volume`]: clamped volume/balance/mute model, pushed to the chip on change
//! - [`config`]: checksum-protected record in non-volatile storage
//!
//! Hardware is reached only through [`hal`], so all of the above runs on host.

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod command_loop;
pub mod config;
pub mod fault;
pub mod hal;
pub mod learning;
pub mod remote;
pub mod volume;

pub use app::{App, Peripherals, PhaseKind};
pub use command_loop::{CommandLoop, LoopEvent};
pub use config::{ConfigRecord, ControllerConfig, PersistentStore, StoreError};
pub use fault::{FaultCode, FaultState};
pub use learning::{AbortReason, LearnState, LearnStep, LearningSession};
pub use remote::{RemoteProfile, SemanticCommand};
pub use volume::{AudioSettings, AudioState, VolumeController};
