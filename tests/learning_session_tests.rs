//! Remote learning state machine tests

mod common;

use common::MockPin;
use ir_volume_remote::hal::{IrFrame, Indicators};
use ir_volume_remote::{AbortReason, LearnState, LearnStep, LearningSession, RemoteProfile, SemanticCommand};

type Leds = Indicators<MockPin, MockPin>;

fn leds() -> Leds {
    Indicators::new(MockPin::new(), MockPin::new())
}

/// One main loop iteration as the controller runs it.
fn step(session: &mut LearningSession, leds: &mut Leds, now_ms: u64, frame: Option<IrFrame>) -> LearnStep {
    leds.tick(now_ms);
    session.step(now_ms, frame, leds)
}

/// Slot captures 1.1 s apart, after each confirmation blink.
const SLOT_GAP_MS: u64 = 1100;

#[test]
fn test_learns_all_slots_in_order() {
    let mut session = LearningSession::new(None);
    let mut leds = leds();
    let codes = [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5];

    for (idx, &code) in codes.iter().enumerate() {
        let now = idx as u64 * SLOT_GAP_MS;
        assert_eq!(session.state(), LearnState::AwaitingSlot(idx));
        assert_eq!(session.expected(), Some(SemanticCommand::from_slot(idx)));

        let result = step(&mut session, &mut leds, now, Some(IrFrame::press(0x77, code)));

        if idx < 5 {
            assert_eq!(
                result,
                LearnStep::Captured {
                    command: SemanticCommand::from_slot(idx),
                    code
                }
            );
        } else {
            assert_eq!(result, LearnStep::Completed(RemoteProfile::new(0x77, codes)));
        }
    }

    assert_eq!(session.state(), LearnState::Completed);
    assert_eq!(session.expected(), None);
}

#[test]
fn test_abort_on_address_mismatch() {
    let mut session = LearningSession::new(None);
    let mut leds = leds();

    step(&mut session, &mut leds, 0, Some(IrFrame::press(0x10, 0xA0)));
    let result = step(&mut session, &mut leds, SLOT_GAP_MS, Some(IrFrame::press(0x20, 0xA1)));

    let reason = AbortReason::AddressMismatch {
        expected: 0x10,
        received: 0x20,
    };
    assert_eq!(result, LearnStep::Aborted(reason));
    assert_eq!(session.state(), LearnState::Aborted(reason));

    // Feedback LED blinks, controller LED off
    assert!(leds.is_blinking());
    assert_eq!(leds.levels(), (true, false));

    // Nothing more happens once aborted
    let later = step(&mut session, &mut leds, 20_000, Some(IrFrame::press(0x10, 0xA1)));
    assert_eq!(later, LearnStep::Pending);
}

#[test]
fn test_abort_pattern_is_fifteen_fast_blinks() {
    let mut session = LearningSession::new(None);
    let mut leds = leds();
    step(&mut session, &mut leds, 0, Some(IrFrame::press(0x10, 0xA0)));
    step(&mut session, &mut leds, 1000, Some(IrFrame::press(0x20, 0xA1)));

    let mut rising_edges = 0;
    let mut last = false;
    for t in (1000..8000).step_by(50) {
        leds.tick(t);
        let (feedback, _) = leds.levels();
        if feedback && !last {
            rising_edges += 1;
        }
        last = feedback;
    }
    assert_eq!(rising_edges, 16, "First flash plus 15 repetitions");
    assert!(!leds.is_blinking());
}

#[test]
fn test_ignored_first_command_aborts() {
    let mut session = LearningSession::new(Some(0x42));
    let mut leds = leds();

    let result = step(&mut session, &mut leds, 0, Some(IrFrame::press(0x77, 0x42)));

    assert_eq!(result, LearnStep::Aborted(AbortReason::IgnoredFirstCommand(0x42)));
    assert!(!leds.is_blinking());
}

#[test]
fn test_ignore_code_only_guards_first_slot() {
    let mut session = LearningSession::new(Some(0x42));
    let mut leds = leds();

    step(&mut session, &mut leds, 0, Some(IrFrame::press(0x77, 0x41)));
    let result = step(&mut session, &mut leds, SLOT_GAP_MS, Some(IrFrame::press(0x77, 0x42)));

    assert_eq!(
        result,
        LearnStep::Captured {
            command: SemanticCommand::Down,
            code: 0x42
        }
    );
}

#[test]
fn test_repeat_frames_do_not_count() {
    let mut session = LearningSession::new(None);
    let mut leds = leds();

    let result = step(&mut session, &mut leds, 0, Some(IrFrame::repeat(0x77, 0xA0)));

    assert_eq!(result, LearnStep::Pending);
    assert_eq!(session.state(), LearnState::AwaitingSlot(0));
}

#[test]
fn test_extra_frames_of_one_press_are_dropped() {
    let mut session = LearningSession::new(None);
    let mut leds = leds();

    step(&mut session, &mut leds, 0, Some(IrFrame::press(0x77, 0xA0)));
    // Second frame of the same press, and a stray one, during the confirmation blink
    assert_eq!(step(&mut session, &mut leds, 40, Some(IrFrame::press(0x77, 0xA0))), LearnStep::Pending);
    assert_eq!(step(&mut session, &mut leds, 900, Some(IrFrame::press(0x99, 0xA0))), LearnStep::Pending);

    assert_eq!(session.state(), LearnState::AwaitingSlot(1));
}

#[test]
fn test_first_slot_alternates_leds() {
    let mut session = LearningSession::new(None);
    let mut leds = leds();

    step(&mut session, &mut leds, 0, None);
    assert!(leds.is_alternating());
    assert_eq!(leds.levels(), (false, true));

    step(&mut session, &mut leds, 250, None);
    assert_eq!(leds.levels(), (true, false));

    step(&mut session, &mut leds, 450, None);
    assert_eq!(leds.levels(), (false, true));
}

#[test]
fn test_later_slots_do_not_alternate() {
    let mut session = LearningSession::new(None);
    let mut leds = leds();

    step(&mut session, &mut leds, 0, Some(IrFrame::press(0x77, 0xA0)));
    // Confirmation blink on the controller LED
    assert!(leds.is_blinking());
    assert_eq!(leds.levels(), (false, true));

    step(&mut session, &mut leds, 1500, None);
    assert!(!leds.is_alternating());
    assert_eq!(leds.levels(), (false, false));
}

#[test]
fn test_completion_blinks_controller_led() {
    let mut session = LearningSession::new(None);
    let mut leds = leds();

    for idx in 0..6u16 {
        step(&mut session, &mut leds, idx as u64 * SLOT_GAP_MS, Some(IrFrame::press(0x77, idx)));
    }

    assert_eq!(session.state(), LearnState::Completed);
    assert!(leds.is_blinking());
    assert_eq!(leds.levels(), (false, true));

    let done = 5 * SLOT_GAP_MS + 7 * 333;
    leds.tick(done);
    assert!(!leds.is_blinking());
}
