//! Run-time command dispatch.
//!
//! Turns decoded frames into volume actions and times the Preset button:
//! a short press recalls the stored preset, holding it saves the current
//! level as the new preset.
//!
//! Pure timing logic; time comes in through `now_ms`.

use embedded_hal::i2c::I2c;

use crate::config::{DEBOUNCE_MS, LONG_PRESS_MS, RELEASE_DETECT_MS, SHORT_PRESS_MS};
use crate::hal::ir::IrFrame;
use crate::remote::{RemoteProfile, SemanticCommand};
use crate::volume::VolumeController;

/// Outcome of one [`CommandLoop::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopEvent {
    /// Nothing happened.
    Idle,
    /// Frame dropped, too close to the previous accepted one.
    Debounced,
    /// Frame accepted and routed.
    Dispatched(SemanticCommand),
    /// Short Preset press released: apply the stored preset.
    RecallPreset,
    /// Preset held long enough: store the current level.
    SavePreset,
}

/// Timestamps of an ongoing Preset press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PressWindow {
    pub first_ms: u64,
    pub last_ms: u64,
    /// Save already fired for this press.
    pub saved: bool,
}

impl PressWindow {
    #[inline]
    pub fn duration_ms(&self) -> u64 {
        self.last_ms.saturating_sub(self.first_ms)
    }
}

/// Debounce and Preset gesture state.
#[derive(Debug, Default)]
pub struct CommandLoop {
    last_accepted_ms: Option<u64>,
    press: Option<PressWindow>,
}

impl CommandLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open Preset press, if any.
    #[inline]
    pub fn press_window(&self) -> Option<PressWindow> {
        self.press
    }

    /// One loop iteration.
    ///
    /// With a frame: debounce, classify, dispatch. Without one: evaluate the
    /// Preset gesture.
    pub fn tick<I2C: I2c>(
        &mut self,
        now_ms: u64,
        frame: Option<IrFrame>,
        profile: &RemoteProfile,
        volume: &mut VolumeController<'_, I2C>,
    ) -> LoopEvent {
        match frame {
            Some(frame) => self.dispatch(now_ms, frame, profile, volume),
            None => self.evaluate_preset(now_ms),
        }
    }

    fn dispatch<I2C: I2c>(
        &mut self,
        now_ms: u64,
        frame: IrFrame,
        profile: &RemoteProfile,
        volume: &mut VolumeController<'_, I2C>,
    ) -> LoopEvent {
        // Prevent unintended long pressed buttons
        if let Some(last) = self.last_accepted_ms {
            if now_ms.saturating_sub(last) < DEBOUNCE_MS {
                return LoopEvent::Debounced;
            }
        }
        self.last_accepted_ms = Some(now_ms);

        let command = profile.lookup(frame.command);
        log::info!("{}", command.name());

        match command {
            SemanticCommand::Up => {
                volume.volume_up();
            }
            SemanticCommand::Down => {
                volume.volume_down();
            }
            SemanticCommand::Mute => {
                // A held Mute button must not flip the state on every repeat
                if !frame.is_repetition() {
                    volume.toggle_mute();
                }
            }
            SemanticCommand::Left => {
                volume.balance_left();
            }
            SemanticCommand::Right => {
                volume.balance_right();
            }
            SemanticCommand::Preset => match self.press.as_mut() {
                Some(window) => window.last_ms = now_ms,
                None => {
                    self.press = Some(PressWindow {
                        first_ms: now_ms,
                        last_ms: now_ms,
                        saved: false,
                    })
                }
            },
            SemanticCommand::Unknown => {}
        }

        if command != SemanticCommand::Preset {
            self.press = None;
        }
        LoopEvent::Dispatched(command)
    }

    fn evaluate_preset(&mut self, now_ms: u64) -> LoopEvent {
        let window = match self.press.as_mut() {
            Some(window) => window,
            None => return LoopEvent::Idle,
        };
        let duration = window.duration_ms();
        let released = now_ms.saturating_sub(window.last_ms) > RELEASE_DETECT_MS;

        if duration < SHORT_PRESS_MS {
            if released {
                log::debug!("Recall preset after {} ms press", duration);
                self.press = None;
                return LoopEvent::RecallPreset;
            }
            return LoopEvent::Idle;
        }

        if duration > LONG_PRESS_MS && !window.saved {
            log::debug!("Save preset after {} ms press", duration);
            window.saved = true;
            return LoopEvent::SavePreset;
        }

        if released {
            // Long press let go: nothing more to do for this window
            self.press = None;
        }
        LoopEvent::Idle
    }
}
