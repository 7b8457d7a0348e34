//! Game session: progression plus the level gates and the open challenge.
//!
//! This is the surface the presentation layer talks to. Each operation
//! returns an [`Event`] describing the new state, or a recoverable
//! [`GameError`] when nothing changed (or, for an abandoned challenge, when
//! the attempt ended without success).
//!
//! A volume challenge unlocks its level from inside [`GameSession::sample`],
//! on the single sample that moves the challenge to success.

use std::time::Duration;

use chrono::Utc;

use crate::challenge::{duration_ms, ChallengeOutcome, ThresholdChallenge, VolumeMeter};
use crate::detector::{DetectorKind, SignalSource, SuccessDetector};
use crate::error::{ConfigError, GameError, ValidationError};
use crate::events::{Event, UnlockSource};
use crate::level::{LevelGate, LevelProgression, Screen};
use crate::storage::Config;

#[derive(Debug, Clone)]
struct ActiveChallenge {
    level: u8,
    challenge: ThresholdChallenge,
    tick: Duration,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    progression: LevelProgression,
    /// Gate for level `n` at index `n - 1`.
    gates: Vec<LevelGate>,
    active: Option<ActiveChallenge>,
    meter: VolumeMeter,
    celebration_delay_ms: u64,
}

impl GameSession {
    /// Create a session with one level per gate.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no gates or more than 255.
    pub fn new(gates: Vec<LevelGate>) -> Result<Self, ValidationError> {
        let count = u8::try_from(gates.len()).map_err(|_| ValidationError::OutOfBounds {
            collection: "levels".into(),
            index: gates.len(),
            len: usize::from(u8::MAX),
        })?;
        Ok(Self {
            progression: LevelProgression::new(count)?,
            gates,
            active: None,
            meter: VolumeMeter::default(),
            celebration_delay_ms: 0,
        })
    }

    /// Build a session from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut session = Self::new(config.gates())?;
        session.meter = config.meter();
        session.celebration_delay_ms = config.feedback.celebration_delay_ms;
        Ok(session)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn progression(&self) -> &LevelProgression {
        &self.progression
    }

    pub fn gate(&self, level: u8) -> Option<&LevelGate> {
        self.gates.get(usize::from(level).checked_sub(1)?)
    }

    pub fn active_challenge(&self) -> Option<&ThresholdChallenge> {
        self.active.as_ref().map(|a| &a.challenge)
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            progression: self.progression.snapshot(),
            challenge: self.active.as_ref().map(|a| a.challenge.snapshot()),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Leave the home screen.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if a level is already showing.
    pub fn start(&mut self) -> Result<Event, GameError> {
        if !self.progression.start() {
            return Err(GameError::invalid("a level is already showing"));
        }
        Ok(self.level_shown())
    }

    /// Submit a password for the displayed level.
    ///
    /// # Errors
    ///
    /// `WrongSecret` on mismatch, `GateMismatch` if the level is not a
    /// password level, `InvalidTransition` on the home screen.
    pub fn submit_secret(&mut self, secret: &str) -> Result<Event, GameError> {
        let level = self.shown_level()?;
        let expected = match self.gate(level) {
            Some(LevelGate::Secret { expected }) => expected.clone(),
            _ => return Err(self.mismatch(level, "secret")),
        };
        let newly_unlocked = !self.progression.is_unlocked(level);
        if self.progression.attempt_unlock(level, secret, &expected) {
            Ok(self.unlocked(level, UnlockSource::Secret, newly_unlocked))
        } else {
            Err(GameError::WrongSecret { level })
        }
    }

    /// Open the volume challenge for the displayed level.
    ///
    /// Entering again while one is open restarts it.
    ///
    /// # Errors
    ///
    /// `GateMismatch` if the level is not a volume level,
    /// `InvalidTransition` on the home screen.
    pub fn enter_challenge(&mut self) -> Result<Event, GameError> {
        let level = self.shown_level()?;
        let spec = match self.gate(level) {
            Some(LevelGate::Volume { challenge }) => challenge.clone(),
            _ => return Err(self.mismatch(level, "volume")),
        };
        self.active = Some(ActiveChallenge {
            level,
            challenge: spec.build(),
            tick: spec.tick_interval(),
        });
        tracing::debug!(level, ?spec, "challenge started");
        Ok(Event::ChallengeStarted {
            level,
            required_level_db: spec.required_level_db,
            required_duration_ms: spec.required_duration_ms,
            tick_interval_ms: spec.tick_interval_ms,
            policy: spec.policy,
            at: Utc::now(),
        })
    }

    /// Feed one reading covering `dt` to the open challenge.
    ///
    /// # Errors
    ///
    /// `NoActiveChallenge` if no challenge screen is open.
    pub fn sample(&mut self, value: f32, dt: Duration) -> Result<Event, GameError> {
        let active = self.active.as_mut().ok_or(GameError::NoActiveChallenge)?;
        let level = active.level;
        let transition = active.challenge.sample(value, dt);
        let challenge = &active.challenge;

        match transition {
            Some(ChallengeOutcome::Success) => {
                let elapsed_ms = duration_ms(challenge.elapsed());
                let samples = challenge.samples_seen();
                self.progression.unlock_by_challenge(level);
                Ok(Event::ChallengeSucceeded {
                    level,
                    elapsed_ms,
                    samples,
                    celebrate_for_ms: self.celebration_delay_ms,
                    complete: self.progression.is_complete(),
                    at: Utc::now(),
                })
            }
            Some(ChallengeOutcome::Failure) => Ok(Event::ChallengeFailed {
                level,
                samples: challenge.samples_seen(),
                at: Utc::now(),
            }),
            Some(ChallengeOutcome::InProgress) | None => Ok(Event::ChallengeProgress {
                level,
                value,
                tone: self.meter.tone(challenge, value),
                meter: self.meter.fill(value),
                elapsed_ms: duration_ms(challenge.elapsed()),
                progress: challenge.progress(),
                outcome: challenge.current_outcome(),
                at: Utc::now(),
            }),
        }
    }

    /// Feed one reading covering the challenge's configured tick interval.
    ///
    /// # Errors
    ///
    /// `NoActiveChallenge` if no challenge screen is open.
    pub fn sample_tick(&mut self, value: f32) -> Result<Event, GameError> {
        let tick = self
            .active
            .as_ref()
            .map(|a| a.tick)
            .ok_or(GameError::NoActiveChallenge)?;
        self.sample(value, tick)
    }

    /// Drain `source` into the open challenge, one reading per `dt`, until
    /// the attempt finishes or the source runs dry.
    ///
    /// # Errors
    ///
    /// `NoActiveChallenge` if no challenge screen is open.
    pub fn run_challenge(
        &mut self,
        source: &mut dyn SignalSource,
        dt: Duration,
    ) -> Result<Vec<Event>, GameError> {
        if self.active.is_none() {
            return Err(GameError::NoActiveChallenge);
        }
        let mut events = Vec::new();
        while self
            .active_challenge()
            .is_some_and(|c| !c.current_outcome().is_finished())
        {
            let Some(value) = source.next_level() else {
                break;
            };
            events.push(self.sample(value, dt)?);
        }
        Ok(events)
    }

    /// Close the challenge screen.
    ///
    /// # Errors
    ///
    /// `ChallengeAbandoned` if the attempt had not succeeded yet; the attempt
    /// is recorded as a failure and the player may enter again.
    /// `NoActiveChallenge` if no challenge screen is open.
    pub fn leave_challenge(&mut self) -> Result<Event, GameError> {
        let mut active = self.active.take().ok_or(GameError::NoActiveChallenge)?;
        if active.challenge.cancel() {
            tracing::debug!(level = active.level, "challenge abandoned");
            return Err(GameError::ChallengeAbandoned {
                level: active.level,
            });
        }
        Ok(Event::ChallengeClosed {
            level: active.level,
            outcome: active.challenge.current_outcome(),
            at: Utc::now(),
        })
    }

    /// An AR or NFC mini-game reported success for the displayed level.
    ///
    /// # Errors
    ///
    /// `GateMismatch` if the displayed level is not gated by `kind`,
    /// `InvalidTransition` on the home screen.
    pub fn report_detector_success(&mut self, kind: DetectorKind) -> Result<Event, GameError> {
        let level = self.shown_level()?;
        match self.gate(level) {
            Some(LevelGate::Detector { detector }) if *detector == kind => {}
            _ => return Err(self.mismatch(level, &kind.to_string())),
        }
        let newly_unlocked = self.progression.unlock_by_challenge(level);
        let source = UnlockSource::Detector { detector: kind };
        Ok(self.unlocked(level, source, newly_unlocked))
    }

    /// Poll a detector once and apply its success, if any.
    ///
    /// # Errors
    ///
    /// As [`GameSession::report_detector_success`].
    pub fn poll_detector(
        &mut self,
        detector: &mut dyn SuccessDetector,
    ) -> Result<Option<Event>, GameError> {
        if !detector.poll() {
            return Ok(None);
        }
        self.report_detector_success(detector.kind()).map(Some)
    }

    /// Show the next level.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if the displayed level is locked or last, or on
    /// the home screen.
    pub fn advance(&mut self) -> Result<Event, GameError> {
        let level = self.shown_level()?;
        if !self.progression.advance() {
            let reason = if self.progression.is_unlocked(level) {
                format!("level {level} is the last level")
            } else {
                format!("level {level} is still locked")
            };
            return Err(GameError::invalid(reason));
        }
        self.active = None;
        Ok(self.level_shown())
    }

    /// Return to the home screen, closing any open challenge.
    pub fn home(&mut self) -> Event {
        if let Some(mut active) = self.active.take() {
            active.challenge.cancel();
        }
        self.progression.reset_to_home();
        Event::ReturnedHome {
            unlocked_levels: self.progression.unlocked_levels(),
            at: Utc::now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn shown_level(&self) -> Result<u8, GameError> {
        match self.progression.screen() {
            Screen::Level(level) => Ok(level),
            Screen::Home => Err(GameError::invalid("no level is showing")),
        }
    }

    fn mismatch(&self, level: u8, attempted: &str) -> GameError {
        GameError::GateMismatch {
            level,
            attempted: attempted.to_string(),
        }
    }

    fn level_shown(&self) -> Event {
        let level = self.progression.current_level();
        Event::LevelShown {
            level,
            gate: self
                .gate(level)
                .map(LevelGate::kind)
                .unwrap_or(crate::level::GateKind::Secret),
            at: Utc::now(),
        }
    }

    fn unlocked(&self, level: u8, source: UnlockSource, newly_unlocked: bool) -> Event {
        Event::LevelUnlocked {
            level,
            source,
            newly_unlocked,
            complete: self.progression.is_complete(),
            at: Utc::now(),
        }
    }
}
