//! Top-level controller.
//!
//! Startup sequence, all driven by [`App::tick`]:
//!
//! ```text
//! start ─▶ restore ─┬─ invalid ─▶ Learning (repeat until stored) ─┐
//!                   └─ valid ───▶ RelearnWindow (5 s) ─┬─ frame ──▶ Learning ─┤
//!                                                      └─ timeout ────────────┴─▶ Running
//! ```
//!
//! Every tick polls the decoder once and does a bounded amount of work, so
//! the debounce and Preset timings stay accurate.

use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use crate::command_loop::{CommandLoop, LoopEvent};
use crate::config::{ConfigRecord, ControllerConfig, PersistentStore, StoreError};
use crate::fault::{FaultCode, FaultState};
use crate::hal::ir::{IrDecoder, IrFrame};
use crate::hal::led::{Indicators, Led, PRESET_SAVED};
use crate::hal::pt2257::Pt2257;
use crate::hal::storage::Storage;
use crate::learning::{LearnStep, LearningSession};
use crate::remote::RemoteProfile;
use crate::volume::{AudioSettings, VolumeController};

/// Hardware handed to the [`App`].
pub struct Peripherals<D, S, I2C, F, C> {
    pub decoder: D,
    pub storage: S,
    pub i2c: I2C,
    /// Red LED.
    pub feedback_led: F,
    /// Green LED.
    pub controller_led: C,
}

/// Externally visible phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseKind {
    /// `start` not called yet.
    Idle,
    Learning,
    RelearnWindow,
    Running,
}

enum Phase {
    Idle,
    Learning(LearningSession),
    RelearnWindow { until_ms: u64 },
    Running(CommandLoop),
}

/// The volume remote controller.
pub struct App<'a, D, S, I2C, F, C> {
    config: ControllerConfig,
    decoder: D,
    store: PersistentStore<S>,
    volume: VolumeController<'a, I2C>,
    leds: Indicators<F, C>,
    faults: &'a FaultState,
    /// Last valid record, `None` until one is restored or stored.
    record: Option<ConfigRecord>,
    phase: Phase,
}

impl<'a, D, S, I2C, F, C> App<'a, D, S, I2C, F, C>
where
    D: IrDecoder,
    S: Storage,
    I2C: I2c,
    F: OutputPin,
    C: OutputPin,
{
    pub fn new(
        peripherals: Peripherals<D, S, I2C, F, C>,
        config: ControllerConfig,
        faults: &'a FaultState,
    ) -> Self {
        let chip = Pt2257::with_address(peripherals.i2c, config.attenuator_address);
        Self {
            config,
            decoder: peripherals.decoder,
            store: PersistentStore::new(peripherals.storage, config.storage_offset),
            volume: VolumeController::new(chip, config.swap_left_right, faults),
            leds: Indicators::new(peripherals.feedback_led, peripherals.controller_led),
            faults,
            record: None,
            phase: Phase::Idle,
        }
    }

    /// Apply the startup level and load the configuration.
    ///
    /// Without a valid record learning starts right away; otherwise a new
    /// remote can be learned during the relearn window.
    pub fn start(&mut self, now_ms: u64) {
        let startup = AudioSettings::default();
        self.volume.preset(startup.volume, startup.balance, false);

        self.phase = match self.store.restore() {
            Ok(record) => {
                self.record = Some(record);
                log::info!("Time to learn a new remote?");
                self.leds.steady(Led::Controller);
                Phase::RelearnWindow {
                    until_ms: now_ms + self.config.relearn_window_ms,
                }
            }
            Err(e) => {
                self.note_store_error(e);
                self.begin_learning(None)
            }
        };
    }

    /// One main loop iteration.
    pub fn tick(&mut self, now_ms: u64) {
        self.leds.tick(now_ms);
        let frame = self.decoder.poll();

        self.phase = match core::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => Phase::Idle,
            Phase::Learning(session) => self.tick_learning(now_ms, frame, session),
            Phase::RelearnWindow { until_ms } => self.tick_relearn(now_ms, frame, until_ms),
            Phase::Running(mut commands) => {
                self.tick_running(now_ms, frame, &mut commands);
                Phase::Running(commands)
            }
        };
    }

    pub fn phase(&self) -> PhaseKind {
        match self.phase {
            Phase::Idle => PhaseKind::Idle,
            Phase::Learning(_) => PhaseKind::Learning,
            Phase::RelearnWindow { .. } => PhaseKind::RelearnWindow,
            Phase::Running(_) => PhaseKind::Running,
        }
    }

    /// Active learning session, if any.
    pub fn learning(&self) -> Option<&LearningSession> {
        match &self.phase {
            Phase::Learning(session) => Some(session),
            _ => None,
        }
    }

    pub fn record(&self) -> Option<&ConfigRecord> {
        self.record.as_ref()
    }

    pub fn profile(&self) -> Option<&RemoteProfile> {
        self.record.as_ref().map(|r| &r.profile)
    }

    pub fn volume(&self) -> &VolumeController<'a, I2C> {
        &self.volume
    }

    pub fn indicators(&self) -> &Indicators<F, C> {
        &self.leds
    }

    pub fn store(&self) -> &PersistentStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PersistentStore<S> {
        &mut self.store
    }

    pub fn decoder_mut(&mut self) -> &mut D {
        &mut self.decoder
    }

    pub fn faults(&self) -> &FaultState {
        self.faults
    }

    fn begin_learning(&mut self, ignore: Option<u16>) -> Phase {
        self.leds.release();
        Phase::Learning(LearningSession::new(ignore))
    }

    fn begin_running(&mut self) -> Phase {
        log::info!("Controller is up and running!");
        self.leds.release();
        Phase::Running(CommandLoop::new())
    }

    fn tick_learning(&mut self, now_ms: u64, frame: Option<IrFrame>, mut session: LearningSession) -> Phase {
        match session.step(now_ms, frame, &mut self.leds) {
            LearnStep::Completed(profile) => self.commit_profile(profile),
            LearnStep::Aborted(reason) => {
                log::warn!("Learning aborted: {:?}", reason);
                self.after_failed_learning()
            }
            LearnStep::Pending | LearnStep::Captured { .. } => Phase::Learning(session),
        }
    }

    /// Store a freshly learned profile.
    ///
    /// A previous valid record keeps its preset; otherwise the current level
    /// becomes the preset.
    fn commit_profile(&mut self, profile: RemoteProfile) -> Phase {
        let settings = self
            .record
            .map(|r| r.settings)
            .unwrap_or_else(|| self.volume.settings());
        let record = ConfigRecord::new(profile, settings);

        match self.store.store(&record) {
            Ok(()) => {
                self.record = Some(record);
                self.begin_running()
            }
            Err(e) => {
                self.note_store_error(e);
                self.after_failed_learning()
            }
        }
    }

    /// Without a valid record learning starts over; otherwise keep the old remote.
    fn after_failed_learning(&mut self) -> Phase {
        if self.record.is_some() {
            self.begin_running()
        } else {
            self.begin_learning(None)
        }
    }

    fn tick_relearn(&mut self, now_ms: u64, frame: Option<IrFrame>, until_ms: u64) -> Phase {
        if let Some(frame) = frame {
            self.leds.flash_feedback(now_ms);
            if !frame.is_repetition() {
                log::info!("Learn a new remote was triggered");
                // The triggering button is likely still held: never learn it as Up
                return self.begin_learning(Some(frame.command));
            }
        }
        if now_ms >= until_ms {
            return self.begin_running();
        }
        Phase::RelearnWindow { until_ms }
    }

    fn tick_running(&mut self, now_ms: u64, frame: Option<IrFrame>, commands: &mut CommandLoop) {
        if frame.is_some() {
            self.leds.flash_feedback(now_ms);
        }
        // Frames arriving during a confirmation blink are dropped
        if self.leds.is_blinking() {
            return;
        }
        let record = match self.record {
            Some(record) => record,
            None => return,
        };

        match commands.tick(now_ms, frame, &record.profile, &mut self.volume) {
            LoopEvent::RecallPreset => {
                log::info!(
                    "Recall preset: volume {}, balance {:+}",
                    record.settings.volume,
                    record.settings.balance
                );
                self.volume
                    .preset(record.settings.volume, record.settings.balance, false);
            }
            LoopEvent::SavePreset => self.save_preset(now_ms, record),
            LoopEvent::Idle | LoopEvent::Debounced | LoopEvent::Dispatched(_) => {}
        }
    }

    fn save_preset(&mut self, now_ms: u64, mut record: ConfigRecord) {
        let settings = self.volume.settings();
        log::info!("Save preset: volume {}, balance {:+}", settings.volume, settings.balance);
        if record.settings != settings {
            record.settings = settings;
            if let Err(e) = self.store.store(&record) {
                self.note_store_error(e);
                return;
            }
            self.record = Some(record);
        }
        self.leds.blink(PRESET_SAVED, now_ms);
    }

    /// Errors are logged by the store; only hardware trouble becomes a fault.
    fn note_store_error(&self, e: StoreError) {
        match e {
            // Expected on first power-up
            StoreError::ChecksumMismatch { .. } => {}
            StoreError::VerifyFailed => self.faults.set(FaultCode::StorageVerify),
            StoreError::Device => self.faults.set(FaultCode::StorageDevice),
        }
    }
}
