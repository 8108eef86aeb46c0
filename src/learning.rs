//! Remote learning state machine.
//!
//! Captures one code per [`SemanticCommand`] slot, in slot order, from a
//! single remote. Driven by [`LearningSession::step`] from the main loop;
//! it never waits for a frame itself.
//!
//! # States
//!
//! ```text
//! AwaitingSlot(0) ──▶ AwaitingSlot(1) ──▶ ... ──▶ AwaitingSlot(5) ──▶ Completed
//!       │                   │                           │
//!       └── ignored code    └──── address mismatch ─────┴──▶ Aborted
//! ```

use embedded_hal::digital::OutputPin;

use crate::hal::ir::IrFrame;
use crate::hal::led::{Indicators, LEARN_ABORTED, LEARN_COMPLETE, READY_ALTERNATE_MS, SLOT_CAPTURED};
use crate::remote::{RemoteProfile, SemanticCommand, NUMBER_OF_COMMANDS};

/// Why a session stopped early.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    /// First frame carried the ignored code, e.g. a remote stuck under a cushion.
    IgnoredFirstCommand(u16),
    /// Frame from a different remote than the first slot.
    AddressMismatch { expected: u16, received: u16 },
}

/// Session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LearnState {
    /// Waiting for the code of this slot index.
    AwaitingSlot(usize),
    Aborted(AbortReason),
    Completed,
}

/// Result of one [`LearningSession::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LearnStep {
    /// Nothing captured this step.
    Pending,
    /// A slot was filled.
    Captured { command: SemanticCommand, code: u16 },
    Aborted(AbortReason),
    /// All slots filled.
    Completed(RemoteProfile),
}

/// One learning attempt.
pub struct LearningSession {
    state: LearnState,
    ignore: Option<u16>,
    address: u16,
    codes: [u16; NUMBER_OF_COMMANDS],
}

impl LearningSession {
    /// Start at slot 0. A first frame with command `ignore` aborts the session.
    pub fn new(ignore: Option<u16>) -> Self {
        log::info!("Learn the remote!");
        Self {
            state: LearnState::AwaitingSlot(0),
            ignore,
            address: 0,
            codes: [0; NUMBER_OF_COMMANDS],
        }
    }

    #[inline]
    pub fn state(&self) -> LearnState {
        self.state
    }

    /// Command whose code is expected next, if still learning.
    pub fn expected(&self) -> Option<SemanticCommand> {
        match self.state {
            LearnState::AwaitingSlot(idx) => Some(SemanticCommand::from_slot(idx)),
            _ => None,
        }
    }

    /// Feed the frame polled this iteration (if any).
    ///
    /// Frames arriving while a confirmation blink runs are dropped: some
    /// remotes send several frames per press and only the first counts.
    /// Repeat frames never count.
    pub fn step<F: OutputPin, C: OutputPin>(
        &mut self,
        now_ms: u64,
        frame: Option<IrFrame>,
        leds: &mut Indicators<F, C>,
    ) -> LearnStep {
        let idx = match self.state {
            LearnState::AwaitingSlot(idx) => idx,
            _ => return LearnStep::Pending,
        };

        if leds.is_blinking() {
            return LearnStep::Pending;
        }
        if idx == 0 {
            // Ready to learn: both LEDs take turns until the first code arrives
            leds.alternate(READY_ALTERNATE_MS, now_ms);
        }

        let frame = match frame {
            Some(frame) if !frame.is_repetition() => frame,
            _ => return LearnStep::Pending,
        };

        if idx == 0 {
            if self.ignore == Some(frame.command) {
                log::warn!("Learning interrupted: invalid first command {:04X}", frame.command);
                leds.off();
                return self.abort(AbortReason::IgnoredFirstCommand(frame.command));
            }
            self.address = frame.address;
        } else if frame.address != self.address {
            log::warn!(
                "Learning interrupted: address {:04X} differs from {:04X}",
                frame.address,
                self.address
            );
            leds.blink(LEARN_ABORTED, now_ms);
            return self.abort(AbortReason::AddressMismatch {
                expected: self.address,
                received: frame.address,
            });
        }

        let command = SemanticCommand::from_slot(idx);
        self.codes[idx] = frame.command;
        log::info!("  {:>8}: {:04X}", command.name(), frame.command);

        if idx + 1 == NUMBER_OF_COMMANDS {
            leds.blink(LEARN_COMPLETE, now_ms);
            self.state = LearnState::Completed;
            return LearnStep::Completed(RemoteProfile::new(self.address, self.codes));
        }

        leds.blink(SLOT_CAPTURED, now_ms);
        self.state = LearnState::AwaitingSlot(idx + 1);
        LearnStep::Captured {
            command,
            code: frame.command,
        }
    }

    fn abort(&mut self, reason: AbortReason) -> LearnStep {
        self.state = LearnState::Aborted(reason);
        LearnStep::Aborted(reason)
    }
}
