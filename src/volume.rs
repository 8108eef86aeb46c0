//! Volume, balance and mute model plus the attenuator-facing controller.
//!
//! [`AudioState`] is the single source of truth: the PT2257 cannot be read
//! back, so whatever was last computed here is assumed to be on the chip.

use embedded_hal::i2c::I2c;

use crate::fault::{FaultCode, FaultState};
use crate::hal::pt2257::{Channel, Pt2257, MAX_ATTENUATION_DB};

pub const VOLUME_MIN: u8 = 0;
pub const VOLUME_MAX: u8 = MAX_ATTENUATION_DB;
/// Smallest clearly audible change, in dB.
pub const VOLUME_STEP: u8 = 3;
pub const BALANCE_MIN: i8 = -20;
pub const BALANCE_MAX: i8 = 20;

/// Volume applied at power-up, a quarter of the range.
pub const DEFAULT_VOLUME: u8 = VOLUME_MIN + (VOLUME_MAX - VOLUME_MIN) / 4;
pub const DEFAULT_BALANCE: i8 = 0;

/// Persistable listening level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioSettings {
    /// 0 (-79 dB) ..= 79 (0 dB)
    pub volume: u8,
    /// -20 (full left) ..= +20 (full right)
    pub balance: i8,
}

impl AudioSettings {
    pub const fn new(volume: u8, balance: i8) -> Self {
        Self { volume, balance }
    }

    /// Same settings with both values forced into range.
    pub fn clamped(self) -> Self {
        Self {
            volume: self.volume.min(VOLUME_MAX),
            balance: self.balance.clamp(BALANCE_MIN, BALANCE_MAX),
        }
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME, DEFAULT_BALANCE)
    }
}

/// Volume/balance/mute with clamped stepping.
///
/// Mutators return whether anything changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioState {
    volume: u8,
    balance: i8,
    muted: bool,
}

impl AudioState {
    pub const fn new(volume: u8, balance: i8, muted: bool) -> Self {
        Self {
            volume,
            balance,
            muted,
        }
    }

    /// Since 79 / 3 is not an integer the steps are [0, 3, 6, ... 75, 78, 79].
    pub fn volume_up(&mut self) -> bool {
        self.set_volume(self.volume as i16 + VOLUME_STEP as i16)
    }

    pub fn volume_down(&mut self) -> bool {
        let target = if self.volume == VOLUME_MAX {
            VOLUME_MAX as i16 - 1
        } else {
            self.volume as i16 - VOLUME_STEP as i16
        };
        self.set_volume(target)
    }

    pub fn balance_left(&mut self) -> bool {
        self.set_balance(self.balance as i16 - 1)
    }

    pub fn balance_right(&mut self) -> bool {
        self.set_balance(self.balance as i16 + 1)
    }

    /// Always reports a change.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        true
    }

    /// Absolute set. Always reports a change so the chip gets rewritten.
    pub fn preset(&mut self, volume: u8, balance: i8, muted: bool) -> bool {
        self.muted = muted;
        self.set_balance(balance as i16);
        self.set_volume(volume as i16);
        true
    }

    #[inline]
    pub fn volume(&self) -> u8 {
        self.volume
    }

    #[inline]
    pub fn balance(&self) -> i8 {
        self.balance
    }

    #[inline]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    #[inline]
    pub fn settings(&self) -> AudioSettings {
        AudioSettings::new(self.volume, self.balance)
    }

    /// Balance-adjusted volume of one channel, 0 when muted.
    pub fn channel_volume(&self, channel: Channel, swap_left_right: bool) -> u8 {
        if self.muted {
            return VOLUME_MIN;
        }
        let bound = match channel {
            Channel::Left => BALANCE_MIN as i32,
            Channel::Right => BALANCE_MAX as i32,
        };
        let volume = self.volume as i32;
        let mut shift = div_round(volume * self.balance as i32, bound);
        if swap_left_right {
            shift = -shift;
        }
        (volume + shift).clamp(VOLUME_MIN as i32, VOLUME_MAX as i32) as u8
    }

    /// Attenuation in dB for (left, right); 0 is loudest, 79 is silence.
    pub fn attenuation(&self, swap_left_right: bool) -> [u8; 2] {
        Channel::BOTH.map(|ch| VOLUME_MAX - self.channel_volume(ch, swap_left_right))
    }

    fn set_volume(&mut self, volume: i16) -> bool {
        let volume = volume.clamp(VOLUME_MIN as i16, VOLUME_MAX as i16) as u8;
        if volume != self.volume {
            self.volume = volume;
            return true;
        }
        false
    }

    fn set_balance(&mut self, balance: i16) -> bool {
        let balance = balance.clamp(BALANCE_MIN as i16, BALANCE_MAX as i16) as i8;
        if balance != self.balance {
            self.balance = balance;
            return true;
        }
        false
    }
}

impl Default for AudioState {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME, DEFAULT_BALANCE, false)
    }
}

/// Integer division rounding half away from zero.
fn div_round(num: i32, den: i32) -> i32 {
    let q = (2 * num.abs() + den.abs()) / (2 * den.abs());
    if (num < 0) != (den < 0) {
        -q
    } else {
        q
    }
}

/// [`AudioState`] wired to a PT2257.
///
/// Every mutator that reports a change rewrites both channels.
pub struct VolumeController<'a, I2C> {
    state: AudioState,
    chip: Pt2257<I2C>,
    swap_left_right: bool,
    faults: &'a FaultState,
}

impl<'a, I2C: I2c> VolumeController<'a, I2C> {
    /// Nothing is sent until the first change or [`Self::apply`].
    pub fn new(chip: Pt2257<I2C>, swap_left_right: bool, faults: &'a FaultState) -> Self {
        Self {
            state: AudioState::default(),
            chip,
            swap_left_right,
            faults,
        }
    }

    pub fn volume_up(&mut self) -> bool {
        let changed = self.state.volume_up();
        self.apply_if(changed)
    }

    pub fn volume_down(&mut self) -> bool {
        let changed = self.state.volume_down();
        self.apply_if(changed)
    }

    pub fn balance_left(&mut self) -> bool {
        let changed = self.state.balance_left();
        self.apply_if(changed)
    }

    pub fn balance_right(&mut self) -> bool {
        let changed = self.state.balance_right();
        self.apply_if(changed)
    }

    pub fn toggle_mute(&mut self) -> bool {
        let changed = self.state.toggle_mute();
        self.apply_if(changed)
    }

    pub fn preset(&mut self, volume: u8, balance: i8, muted: bool) -> bool {
        let changed = self.state.preset(volume, balance, muted);
        self.apply_if(changed)
    }

    #[inline]
    pub fn state(&self) -> &AudioState {
        &self.state
    }

    #[inline]
    pub fn volume(&self) -> u8 {
        self.state.volume()
    }

    #[inline]
    pub fn balance(&self) -> i8 {
        self.state.balance()
    }

    #[inline]
    pub fn is_muted(&self) -> bool {
        self.state.is_muted()
    }

    #[inline]
    pub fn settings(&self) -> AudioSettings {
        self.state.settings()
    }

    /// Bus access, e.g. for inspection in tests.
    pub fn chip(&self) -> &Pt2257<I2C> {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut Pt2257<I2C> {
        &mut self.chip
    }

    /// Push the current state to both channels.
    ///
    /// A bus error is logged and counted; the other channel is still sent.
    pub fn apply(&mut self) {
        log::info!(
            "Apply volume: {}, balance: {:+}, mute: {}",
            self.state.volume(),
            self.state.balance(),
            self.state.is_muted()
        );
        let attenuation = self.state.attenuation(self.swap_left_right);
        for (channel, db) in Channel::BOTH.into_iter().zip(attenuation) {
            if let Err(e) = self.chip.set_attenuation(channel, db) {
                log::error!("{} channel: {}", channel.label(), e);
                self.faults.set(FaultCode::BusTransmit);
            }
        }
    }

    fn apply_if(&mut self, changed: bool) -> bool {
        if changed {
            self.apply();
        }
        changed
    }
}
