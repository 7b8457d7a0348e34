//! Integration tests for a full game session.
//!
//! These tests drive the default four-level game the way a front end would:
//! password, volume challenge, AR and NFC mini-games.

use std::time::Duration;

use puzzlegate_core::{
    ChallengeOutcome, Config, DetectorKind, Event, GameError, GameSession, LevelGate,
    LevelProgression, ManualDetector, ScriptedSignal, Screen, UnlockSource,
};

const TICK: Duration = Duration::from_millis(100);

#[test]
fn test_password_scenario() {
    let mut p = LevelProgression::new(4).unwrap();
    assert!(!p.attempt_unlock(1, "0000", "1234"));
    assert!(p.unlocked_levels().is_empty());
    assert!(p.attempt_unlock(1, "1234", "1234"));
    assert_eq!(p.unlocked_levels(), vec![1]);
    assert!(p.advance());
    assert_eq!(p.current_level(), 2);
}

#[test]
fn test_full_default_game() {
    let config = Config::default();
    let mut session = GameSession::from_config(&config).unwrap();

    // Level 1: password
    assert!(matches!(
        session.start().unwrap(),
        Event::LevelShown { level: 1, .. }
    ));
    assert_eq!(
        session.submit_secret("0000").unwrap_err(),
        GameError::WrongSecret { level: 1 }
    );
    assert!(matches!(
        session.advance(),
        Err(GameError::InvalidTransition { .. })
    ));
    session.submit_secret("0418").unwrap();
    session.advance().unwrap();

    // Level 2: volume, with a dip that restarts the streak
    session.enter_challenge().unwrap();
    let mut levels = vec![-25.0; 5];
    levels.push(-45.0);
    levels.extend(std::iter::repeat(-20.0).take(12));
    let events = session
        .run_challenge(&mut ScriptedSignal::new(levels), TICK)
        .unwrap();
    assert_eq!(events.len(), 16);
    match events.last().unwrap() {
        Event::ChallengeSucceeded {
            level,
            elapsed_ms,
            samples,
            celebrate_for_ms,
            complete,
            ..
        } => {
            assert_eq!(*level, 2);
            assert_eq!(*elapsed_ms, 1000);
            assert_eq!(*samples, 16);
            assert_eq!(*celebrate_for_ms, 1000);
            assert!(!complete);
        }
        other => panic!("Expected ChallengeSucceeded, got {other:?}"),
    }
    assert!(session.progression().is_unlocked(2));
    assert!(matches!(
        session.leave_challenge().unwrap(),
        Event::ChallengeClosed {
            outcome: ChallengeOutcome::Success,
            ..
        }
    ));
    session.advance().unwrap();

    // Level 3: AR "simulate success"
    let mut ar = ManualDetector::new(DetectorKind::Ar);
    ar.press();
    match session.poll_detector(&mut ar).unwrap() {
        Some(Event::LevelUnlocked { level, source, .. }) => {
            assert_eq!(level, 3);
            assert_eq!(
                source,
                UnlockSource::Detector {
                    detector: DetectorKind::Ar
                }
            );
        }
        other => panic!("Expected LevelUnlocked, got {other:?}"),
    }
    session.advance().unwrap();

    // Level 4: NFC
    let event = session.report_detector_success(DetectorKind::Nfc).unwrap();
    assert!(matches!(
        event,
        Event::LevelUnlocked {
            level: 4,
            complete: true,
            ..
        }
    ));
    assert!(session.progression().is_complete());
    assert!(matches!(
        session.advance(),
        Err(GameError::InvalidTransition { .. })
    ));

    // Replay from home keeps the session's unlocks
    session.home();
    assert_eq!(session.progression().screen(), Screen::Home);
    assert_eq!(session.progression().unlocked_levels(), vec![1, 2, 3, 4]);
    session.start().unwrap();
    assert!(session.advance().is_ok());
}

#[test]
fn test_volume_scenario_with_dip_stays_in_progress() {
    let mut config = Config::default();
    config
        .set("levels.1.gate.challenge.required_level_db", "-20")
        .unwrap();
    let mut session = GameSession::from_config(&config).unwrap();
    session.start().unwrap();
    session.submit_secret("0418").unwrap();
    session.advance().unwrap();
    session.enter_challenge().unwrap();

    for i in 1..=10 {
        let value = if i == 5 { -25.0 } else { -15.0 };
        let event = session.sample(value, TICK).unwrap();
        match event {
            Event::ChallengeProgress {
                elapsed_ms,
                outcome,
                ..
            } => {
                if i == 5 {
                    assert_eq!(elapsed_ms, 0);
                }
                assert_eq!(outcome, ChallengeOutcome::InProgress);
            }
            other => panic!("Expected ChallengeProgress at sample {i}, got {other:?}"),
        }
    }
    assert!(!session.progression().is_unlocked(2));
    assert_eq!(
        session.leave_challenge().unwrap_err(),
        GameError::ChallengeAbandoned { level: 2 }
    );
}

#[test]
fn test_gate_mismatch_reports_attempted_gate() {
    let mut session = GameSession::from_config(&Config::default()).unwrap();
    session.start().unwrap();
    let err = session.enter_challenge().unwrap_err();
    assert_eq!(
        err,
        GameError::GateMismatch {
            level: 1,
            attempted: "volume".into()
        }
    );
    assert_eq!(err.to_string(), "Level 1 is not unlocked by volume");
}

#[test]
fn test_events_serialize_with_type_tag() {
    let mut session = GameSession::from_config(&Config::default()).unwrap();
    let event = session.start().unwrap();
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "level_shown");
    assert_eq!(json["level"], 1);
    assert_eq!(json["gate"], "secret");

    let snapshot = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(snapshot["type"], "state_snapshot");
    assert_eq!(snapshot["progression"]["screen"]["screen"], "level");
    assert_eq!(snapshot["progression"]["screen"]["level"], 1);
    assert!(snapshot["challenge"].is_null());
}

#[test]
fn test_level_unlocked_serializes_source() {
    let mut session = GameSession::new(vec![LevelGate::detector(DetectorKind::Ar)]).unwrap();
    session.start().unwrap();
    let event = session.report_detector_success(DetectorKind::Ar).unwrap();
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "level_unlocked");
    assert_eq!(
        json["source"],
        serde_json::json!({ "via": "detector", "detector": "ar" })
    );
    assert_eq!(json["newly_unlocked"], true);
    assert_eq!(json["complete"], true);

    let resent: Event = serde_json::from_value(json).unwrap();
    assert!(matches!(
        resent,
        Event::LevelUnlocked {
            source: UnlockSource::Detector {
                detector: DetectorKind::Ar
            },
            ..
        }
    ));

    let unknown = serde_json::json!({ "via": "challenge" });
    assert!(serde_json::from_value::<UnlockSource>(unknown).is_err());
}
