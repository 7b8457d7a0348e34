//! # Puzzlegate Core Library
//!
//! This library provides the game logic for Puzzlegate, a short sequence of
//! puzzle levels. Every operation is available through the `puzzlegate` CLI;
//! any graphical front end is a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Level Progression**: Unlock state machine over levels `1..=N` that
//!   decides when the player may advance
//! - **Threshold Challenge**: Tick-driven evaluator that requires a signal to
//!   stay above a threshold for a duration. No internal timer; the caller
//!   delivers `sample(value, dt)`
//! - **Detectors**: Opaque AR/NFC success signals and audio level sources
//! - **Storage**: TOML-based configuration of levels and secrets
//!
//! ## Key Components
//!
//! - [`GameSession`]: Facade the presentation layer drives
//! - [`LevelProgression`]: Unlock state machine
//! - [`ThresholdChallenge`]: Volume challenge evaluator
//! - [`Config`]: Level configuration management

pub mod challenge;
pub mod detector;
pub mod error;
pub mod events;
pub mod level;
pub mod session;
pub mod storage;

pub use challenge::{
    ChallengeOutcome, ChallengePolicy, ChallengeSnapshot, ChallengeSpec, MeterTone,
    ThresholdChallenge, VolumeMeter,
};
pub use detector::{DetectorKind, ManualDetector, ScriptedSignal, SignalSource, SuccessDetector};
pub use error::{ConfigError, CoreError, GameError, ValidationError};
pub use events::{Event, UnlockSource};
pub use level::{GateKind, LevelGate, LevelProgression, ProgressionSnapshot, Screen};
pub use session::GameSession;
pub use storage::{Config, FeedbackConfig, LevelConfig};
