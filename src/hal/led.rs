//! Indicator LEDs with non-blocking blink patterns.
//!
//! Two LEDs: the red feedback LED and the green controller LED.
//! Patterns are advanced from [`Indicators::tick`], never by sleeping.

use embedded_hal::digital::OutputPin;

/// Half period of the "ready to learn" alternation.
pub const READY_ALTERNATE_MS: u32 = 200;

/// Controller LED after a learning slot was captured.
pub const SLOT_CAPTURED: BlinkPattern = BlinkPattern::new(Led::Controller, 1000, 0);

/// Controller LED after the last slot was captured.
pub const LEARN_COMPLETE: BlinkPattern = BlinkPattern::new(Led::Controller, 333, 3);

/// Feedback LED after a frame from a different remote interrupted learning.
pub const LEARN_ABORTED: BlinkPattern = BlinkPattern::new(Led::Feedback, 200, 15);

/// Controller LED after the preset was saved.
pub const PRESET_SAVED: BlinkPattern = BlinkPattern::new(Led::Controller, 666, 0);

/// Feedback LED flash for a received IR frame.
pub const FRAME_FLASH_MS: u64 = 50;

/// Indicator LED selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    /// Red LED.
    Feedback,
    /// Green LED.
    Controller,
}

/// A blink: the LED is on for one period, then `recurrences` times off and
/// on again, each phase lasting `period_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkPattern {
    pub led: Led,
    pub period_ms: u32,
    pub recurrences: u16,
}

impl BlinkPattern {
    pub const fn new(led: Led, period_ms: u32, recurrences: u16) -> Self {
        Self {
            led,
            period_ms,
            recurrences,
        }
    }

    /// Number of on/off phases.
    #[inline]
    pub const fn phases(&self) -> u64 {
        self.recurrences as u64 * 2 + 1
    }

    /// Total pattern length.
    #[inline]
    pub const fn duration_ms(&self) -> u64 {
        self.phases() * self.period_ms as u64
    }

    /// LED level `elapsed_ms` into the pattern, `None` once it has finished.
    pub fn level_at(&self, elapsed_ms: u64) -> Option<bool> {
        if self.period_ms == 0 {
            return None;
        }
        let phase = elapsed_ms / self.period_ms as u64;
        if phase >= self.phases() {
            None
        } else {
            Some(phase % 2 == 0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activity {
    Off,
    Steady(Led),
    Alternate { period_ms: u32, since_ms: u64 },
    Blink { pattern: BlinkPattern, since_ms: u64 },
}

/// Owner of both indicator pins.
///
/// Pin errors are ignored: a stuck LED must never stop volume control.
pub struct Indicators<F, C> {
    feedback: F,
    controller: C,
    activity: Activity,
    /// Feedback LED overlay for received frames, on until this time.
    flash_until_ms: Option<u64>,
    /// Last written (feedback, controller) levels.
    levels: (bool, bool),
}

impl<F: OutputPin, C: OutputPin> Indicators<F, C> {
    /// Take both pins and switch them off.
    pub fn new(feedback: F, controller: C) -> Self {
        let mut leds = Self {
            feedback,
            controller,
            activity: Activity::Off,
            flash_until_ms: None,
            levels: (false, false),
        };
        drive(&mut leds.feedback, false);
        drive(&mut leds.controller, false);
        leds
    }

    /// Start a blink pattern, replacing whatever was shown.
    pub fn blink(&mut self, pattern: BlinkPattern, now_ms: u64) {
        self.flash_until_ms = None;
        self.activity = Activity::Blink {
            pattern,
            since_ms: now_ms,
        };
        self.tick(now_ms);
    }

    /// Alternate both LEDs, controller first. Keeps the phase if already alternating.
    pub fn alternate(&mut self, period_ms: u32, now_ms: u64) {
        if !self.is_alternating() {
            self.activity = Activity::Alternate {
                period_ms: period_ms.max(1),
                since_ms: now_ms,
            };
        }
        self.tick(now_ms);
    }

    /// Keep one LED on until told otherwise.
    pub fn steady(&mut self, led: Led) {
        self.activity = Activity::Steady(led);
        self.show(led == Led::Feedback, led == Led::Controller);
    }

    /// Everything off immediately, including a frame flash.
    pub fn off(&mut self) {
        self.activity = Activity::Off;
        self.flash_until_ms = None;
        self.show(false, false);
    }

    /// Light the feedback LED for [`FRAME_FLASH_MS`] on top of the current
    /// display. Ignored while a blink pattern runs.
    pub fn flash_feedback(&mut self, now_ms: u64) {
        if self.is_blinking() {
            return;
        }
        self.flash_until_ms = Some(now_ms + FRAME_FLASH_MS);
        self.tick(now_ms);
    }

    #[inline]
    pub fn is_flashing(&self) -> bool {
        self.flash_until_ms.is_some()
    }

    /// Switch off a steady or alternating display; a running blink finishes on its own.
    pub fn release(&mut self) {
        if !self.is_blinking() {
            self.off();
        }
    }

    #[inline]
    pub fn is_blinking(&self) -> bool {
        matches!(self.activity, Activity::Blink { .. })
    }

    #[inline]
    pub fn is_alternating(&self) -> bool {
        matches!(self.activity, Activity::Alternate { .. })
    }

    /// Current (feedback, controller) levels.
    #[inline]
    pub fn levels(&self) -> (bool, bool) {
        self.levels
    }

    /// Advance the current pattern.
    pub fn tick(&mut self, now_ms: u64) {
        if matches!(self.flash_until_ms, Some(until) if now_ms >= until) {
            self.flash_until_ms = None;
        }
        let flash = self.flash_until_ms.is_some();

        match self.activity {
            Activity::Off => self.show(flash, false),
            Activity::Steady(led) => {
                self.show(flash || led == Led::Feedback, led == Led::Controller)
            }
            Activity::Alternate {
                period_ms,
                since_ms,
            } => {
                let phase = (now_ms.saturating_sub(since_ms) / period_ms as u64) % 2;
                self.show(flash || phase == 1, phase == 0);
            }
            Activity::Blink { pattern, since_ms } => {
                match pattern.level_at(now_ms.saturating_sub(since_ms)) {
                    Some(level) => match pattern.led {
                        Led::Feedback => self.show(level, false),
                        Led::Controller => self.show(false, level),
                    },
                    None => self.off(),
                }
            }
        }
    }

    /// Give the pins back.
    pub fn into_inner(self) -> (F, C) {
        (self.feedback, self.controller)
    }

    fn show(&mut self, feedback: bool, controller: bool) {
        if self.levels.0 != feedback {
            drive(&mut self.feedback, feedback);
        }
        if self.levels.1 != controller {
            drive(&mut self.controller, controller);
        }
        self.levels = (feedback, controller);
    }
}

fn drive<P: OutputPin>(pin: &mut P, high: bool) {
    let _ = if high { pin.set_high() } else { pin.set_low() };
}
