use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::{ChallengeOutcome, ChallengePolicy, ChallengeSnapshot, MeterTone};
use crate::detector::DetectorKind;
use crate::level::{GateKind, ProgressionSnapshot};

/// What caused a level to unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum UnlockSource {
    Secret,
    Detector { detector: DetectorKind },
}

/// Every state change in a game session produces an Event.
/// The presentation layer renders them; nothing calls back into the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    LevelShown {
        level: u8,
        gate: GateKind,
        at: DateTime<Utc>,
    },
    LevelUnlocked {
        level: u8,
        source: UnlockSource,
        /// `false` when the level was already unlocked earlier in the session.
        newly_unlocked: bool,
        /// The last level is unlocked.
        complete: bool,
        at: DateTime<Utc>,
    },
    ChallengeStarted {
        level: u8,
        required_level_db: f32,
        required_duration_ms: u64,
        tick_interval_ms: u64,
        policy: ChallengePolicy,
        at: DateTime<Utc>,
    },
    ChallengeProgress {
        level: u8,
        value: f32,
        tone: MeterTone,
        /// 0.0 .. 1.0 meter fill for `value`.
        meter: f32,
        elapsed_ms: u64,
        progress: f64,
        outcome: ChallengeOutcome,
        at: DateTime<Utc>,
    },
    /// The challenge succeeded and its level was unlocked.
    ChallengeSucceeded {
        level: u8,
        elapsed_ms: u64,
        samples: u32,
        /// How long to show the success state before moving on.
        celebrate_for_ms: u64,
        complete: bool,
        at: DateTime<Utc>,
    },
    ChallengeFailed {
        level: u8,
        samples: u32,
        at: DateTime<Utc>,
    },
    /// The challenge screen was left after the attempt had finished.
    ChallengeClosed {
        level: u8,
        outcome: ChallengeOutcome,
        at: DateTime<Utc>,
    },
    ReturnedHome {
        unlocked_levels: Vec<u8>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        progression: ProgressionSnapshot,
        #[serde(default)]
        challenge: Option<ChallengeSnapshot>,
        at: DateTime<Utc>,
    },
}
