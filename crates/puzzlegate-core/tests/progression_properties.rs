//! Property tests for the unlock state machine.

use proptest::prelude::*;
use puzzlegate_core::{LevelProgression, Screen};

#[derive(Debug, Clone)]
enum Op {
    Start,
    Attempt(u8, String, String),
    Unlock(u8),
    Advance,
    Home,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Start),
        (0u8..6, "[0-9]{4}", "[0-9]{4}").prop_map(|(l, s, e)| Op::Attempt(l, s, e)),
        (0u8..6).prop_map(Op::Unlock),
        Just(Op::Advance),
        Just(Op::Home),
    ]
}

fn apply(p: &mut LevelProgression, op: &Op) {
    match op {
        Op::Start => {
            p.start();
        }
        Op::Attempt(level, submitted, expected) => {
            p.attempt_unlock(*level, submitted, expected);
        }
        Op::Unlock(level) => {
            p.unlock_by_challenge(*level);
        }
        Op::Advance => {
            p.advance();
        }
        Op::Home => p.reset_to_home(),
    }
}

proptest! {
    #[test]
    fn unlock_by_challenge_is_idempotent(
        ops in prop::collection::vec(op(), 0..30),
        level in 1u8..=4,
    ) {
        let mut p = LevelProgression::new(4).unwrap();
        for op in &ops {
            apply(&mut p, op);
        }
        p.unlock_by_challenge(level);
        let once = p.clone();
        prop_assert!(!p.unlock_by_challenge(level));
        prop_assert_eq!(p, once);
    }

    #[test]
    fn wrong_secret_never_changes_progress(
        ops in prop::collection::vec(op(), 0..30),
        level in 0u8..6,
        submitted in "[a-z0-9]{0,6}",
        expected in "[a-z0-9]{0,6}",
    ) {
        prop_assume!(submitted != expected);
        let mut p = LevelProgression::new(4).unwrap();
        for op in &ops {
            apply(&mut p, op);
        }
        let before_unlocked = p.unlocked_levels();
        let before_level = p.current_level();
        let before_screen = p.screen();
        prop_assert!(!p.attempt_unlock(level, &submitted, &expected));
        prop_assert_eq!(p.unlocked_levels(), before_unlocked);
        prop_assert_eq!(p.current_level(), before_level);
        prop_assert_eq!(p.screen(), before_screen);
    }

    #[test]
    fn advance_is_noop_while_current_level_locked(ops in prop::collection::vec(op(), 0..30)) {
        let mut p = LevelProgression::new(4).unwrap();
        for op in &ops {
            apply(&mut p, op);
        }
        if !p.is_unlocked(p.current_level()) {
            let before = p.clone();
            prop_assert!(!p.advance());
            prop_assert_eq!(p, before);
        }
    }

    #[test]
    fn displayed_level_is_always_reachable(ops in prop::collection::vec(op(), 0..40)) {
        let mut p = LevelProgression::new(4).unwrap();
        for op in &ops {
            apply(&mut p, op);
            prop_assert!((1..=4).contains(&p.current_level()));
            if let Screen::Level(level) = p.screen() {
                prop_assert_eq!(level, p.current_level());
                prop_assert!(p.is_reachable(level));
            }
        }
    }
}

#[test]
fn home_then_start_replays_from_level_one() {
    let mut p = LevelProgression::new(4).unwrap();
    p.start();
    for level in 1..=3 {
        p.unlock_by_challenge(level);
        assert!(p.advance());
    }
    assert_eq!(p.current_level(), 4);
    p.unlock_by_challenge(4);
    assert!(p.is_complete());

    p.reset_to_home();
    assert_eq!(p.screen(), Screen::Home);
    assert!(p.start());
    assert_eq!(p.screen(), Screen::Level(1));
    assert!(p.is_complete());
    assert!(p.advance());
}
