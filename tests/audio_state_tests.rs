//! Volume/balance model and attenuator output tests

mod common;

use common::MockI2c;
use ir_volume_remote::fault::FaultCode;
use ir_volume_remote::hal::Pt2257;
use ir_volume_remote::volume::{AudioSettings, AudioState, VolumeController, VOLUME_MAX};
use ir_volume_remote::FaultState;

#[test]
fn test_volume_up_reaches_exactly_max() {
    let mut state = AudioState::new(0, 0, false);
    let mut seen = vec![state.volume()];

    for _ in 0..27 {
        assert!(state.volume_up());
        seen.push(state.volume());
    }

    let mut expected: Vec<u8> = (0..=78).step_by(3).collect();
    expected.push(79);
    assert_eq!(seen, expected);

    assert!(!state.volume_up(), "Further step at max must report unchanged");
    assert_eq!(state.volume(), VOLUME_MAX);
}

#[test]
fn test_volume_down_from_max_rejoins_grid() {
    let mut state = AudioState::new(79, 0, false);

    assert!(state.volume_down());
    assert_eq!(state.volume(), 78);
    assert!(state.volume_down());
    assert_eq!(state.volume(), 75);

    for _ in 0..25 {
        state.volume_down();
    }
    assert_eq!(state.volume(), 0);
    assert!(!state.volume_down());
}

#[test]
fn test_volume_down_clamps_at_zero() {
    let mut state = AudioState::new(2, 0, false);
    assert!(state.volume_down());
    assert_eq!(state.volume(), 0);
}

#[test]
fn test_balance_left_clamps() {
    let mut state = AudioState::new(40, 0, false);

    for call in 1..=41 {
        let changed = state.balance_left();
        assert_eq!(changed, call <= 20, "call {}", call);
    }
    assert_eq!(state.balance(), -20);
}

#[test]
fn test_balance_right_clamps() {
    let mut state = AudioState::new(40, 19, false);
    assert!(state.balance_right());
    assert!(!state.balance_right());
    assert_eq!(state.balance(), 20);
}

#[test]
fn test_toggle_mute_always_changed() {
    let mut state = AudioState::default();

    for i in 0..5 {
        assert!(state.toggle_mute());
        assert_eq!(state.is_muted(), i % 2 == 0);
    }
}

#[test]
fn test_preset_is_absolute_and_clamped() {
    let mut state = AudioState::new(10, 3, true);

    assert!(state.preset(10, 3, true), "Preset always reports a change");
    assert!(state.preset(120, -50, false));
    assert_eq!(state.settings(), AudioSettings::new(79, -20));
    assert!(!state.is_muted());
}

#[test]
fn test_attenuation_with_swapped_wiring() {
    let state = AudioState::new(40, 5, false);
    // round(40 * 5 / 20) = 10, negated by the swap
    assert_eq!(state.attenuation(true), [29, 49]);
    assert_eq!(state.attenuation(false), [49, 29]);
}

#[test]
fn test_attenuation_centered_balance() {
    let state = AudioState::new(40, 0, false);
    assert_eq!(state.attenuation(true), [39, 39]);
}

#[test]
fn test_attenuation_rounds_half_away_from_zero() {
    // 10 * 1 / 20 = 0.5 -> 1
    let state = AudioState::new(10, 1, false);
    assert_eq!(state.attenuation(false), [79 - 9, 79 - 11]);

    // 19 * 1 / 20 = 0.95 -> 1
    let state = AudioState::new(19, 1, false);
    assert_eq!(state.attenuation(false), [61, 59]);
}

#[test]
fn test_attenuation_clamps_channel_volume() {
    let state = AudioState::new(79, 20, false);
    assert_eq!(state.attenuation(false), [79, 0]);
}

#[test]
fn test_muted_is_silent() {
    let state = AudioState::new(79, 0, true);
    assert_eq!(state.attenuation(true), [79, 79]);
}

#[test]
fn test_controller_writes_both_channels() {
    let faults = FaultState::new();
    let mut volume = VolumeController::new(Pt2257::new(MockI2c::new()), true, &faults);

    assert!(volume.preset(40, 5, false));

    let writes = &volume.chip().bus().writes;
    assert_eq!(
        writes,
        &vec![(0x44, vec![0xB2, 0xA9]), (0x44, vec![0x34, 0x29])]
    );
}

#[test]
fn test_controller_skips_bus_when_unchanged() {
    let faults = FaultState::new();
    let mut volume = VolumeController::new(Pt2257::new(MockI2c::new()), true, &faults);
    volume.preset(79, 20, false);
    let before = volume.chip().bus().writes.len();

    assert!(!volume.volume_up());
    assert!(!volume.balance_right());

    assert_eq!(volume.chip().bus().writes.len(), before);
}

#[test]
fn test_controller_mute_sends_silence() {
    let faults = FaultState::new();
    let mut volume = VolumeController::new(Pt2257::new(MockI2c::new()), true, &faults);

    assert!(volume.toggle_mute());

    let writes = &volume.chip().bus().writes;
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].1, vec![0xB7, 0xA9]);
    assert_eq!(writes[1].1, vec![0x37, 0x29]);
}

#[test]
fn test_bus_error_keeps_state_and_counts_fault() {
    let faults = FaultState::new();
    let mut volume = VolumeController::new(Pt2257::new(MockI2c::failing()), true, &faults);

    assert!(volume.volume_up());

    assert_eq!(volume.volume(), 22);
    assert!(faults.is_active());
    assert_eq!(faults.code(), FaultCode::BusTransmit);
    assert_eq!(faults.bus_errors(), 2, "Both channels attempted");
}
