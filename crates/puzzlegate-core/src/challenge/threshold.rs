//! Threshold-over-time challenge evaluator.
//!
//! The challenge does not own a timer. The caller delivers each reading with
//! the time step it covers via `sample(value, dt)`, typically once per
//! 100 ms tick of the presentation layer.
//!
//! ## Outcome Transitions
//!
//! ```text
//! InProgress -> Success   (elapsed >= required_duration)
//! InProgress -> Failure   (cancel, or a low sample under FailFast)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut challenge =
//!     ThresholdChallenge::new(-20.0, Duration::from_secs(1), ChallengePolicy::StreakReset);
//! // On every tick:
//! let tick = Duration::from_millis(100);
//! if let Some(ChallengeOutcome::Success) = challenge.sample(level_db, tick) {
//!     // unlock the level
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What a below-threshold sample does to an attempt in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePolicy {
    /// The streak restarts from zero and the attempt continues.
    #[default]
    StreakReset,
    /// Fixed countdown: any low sample fails the whole attempt.
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeOutcome {
    InProgress,
    Success,
    Failure,
}

impl ChallengeOutcome {
    pub fn is_finished(self) -> bool {
        !matches!(self, ChallengeOutcome::InProgress)
    }
}

/// Serializable view of a challenge for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeSnapshot {
    pub outcome: ChallengeOutcome,
    pub policy: ChallengePolicy,
    pub required_level_db: f32,
    pub required_duration_ms: u64,
    pub elapsed_ms: u64,
    /// 0.0 .. 1.0 of the required duration.
    pub progress: f64,
    pub samples_seen: u32,
    #[serde(default)]
    pub last_value: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ThresholdChallenge {
    required_level: f32,
    required_duration: Duration,
    policy: ChallengePolicy,
    /// Time the current streak has stayed at or above the threshold.
    elapsed: Duration,
    outcome: ChallengeOutcome,
    samples_seen: u32,
    last_value: Option<f32>,
}

impl ThresholdChallenge {
    /// Create a challenge that is ready to receive samples.
    pub fn new(required_level: f32, required_duration: Duration, policy: ChallengePolicy) -> Self {
        Self {
            required_level,
            required_duration,
            policy,
            elapsed: Duration::ZERO,
            outcome: ChallengeOutcome::InProgress,
            samples_seen: 0,
            last_value: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn current_outcome(&self) -> ChallengeOutcome {
        self.outcome
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn required_level(&self) -> f32 {
        self.required_level
    }

    pub fn required_duration(&self) -> Duration {
        self.required_duration
    }

    pub fn policy(&self) -> ChallengePolicy {
        self.policy
    }

    pub fn samples_seen(&self) -> u32 {
        self.samples_seen
    }

    pub fn last_value(&self) -> Option<f32> {
        self.last_value
    }

    /// Whether a reading meets the threshold. NaN never does.
    pub fn is_above_threshold(&self, value: f32) -> bool {
        value >= self.required_level
    }

    /// 0.0 .. 1.0 progress of the current streak.
    pub fn progress(&self) -> f64 {
        if self.required_duration.is_zero() {
            return if self.outcome == ChallengeOutcome::Success {
                1.0
            } else {
                0.0
            };
        }
        (self.elapsed.as_secs_f64() / self.required_duration.as_secs_f64()).min(1.0)
    }

    pub fn snapshot(&self) -> ChallengeSnapshot {
        ChallengeSnapshot {
            outcome: self.outcome,
            policy: self.policy,
            required_level_db: self.required_level,
            required_duration_ms: duration_ms(self.required_duration),
            elapsed_ms: duration_ms(self.elapsed),
            progress: self.progress(),
            samples_seen: self.samples_seen,
            last_value: self.last_value,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Reset for a fresh attempt.
    pub fn start(&mut self) {
        self.elapsed = Duration::ZERO;
        self.outcome = ChallengeOutcome::InProgress;
        self.samples_seen = 0;
        self.last_value = None;
    }

    /// Feed one reading covering `dt` of time.
    ///
    /// Returns the new outcome only on the sample that finishes the attempt,
    /// so a `Some(Success)` is observed exactly once per attempt.
    pub fn sample(&mut self, value: f32, dt: Duration) -> Option<ChallengeOutcome> {
        if self.outcome != ChallengeOutcome::InProgress {
            return None;
        }
        self.samples_seen = self.samples_seen.saturating_add(1);
        self.last_value = Some(value);

        if self.is_above_threshold(value) {
            self.elapsed = self.elapsed.saturating_add(dt);
            if self.elapsed >= self.required_duration {
                self.outcome = ChallengeOutcome::Success;
                tracing::debug!(
                    elapsed_ms = duration_ms(self.elapsed),
                    samples = self.samples_seen,
                    "threshold challenge succeeded"
                );
                return Some(ChallengeOutcome::Success);
            }
            return None;
        }

        match self.policy {
            ChallengePolicy::StreakReset => {
                if !self.elapsed.is_zero() {
                    tracing::debug!(
                        value,
                        lost_ms = duration_ms(self.elapsed),
                        "streak reset"
                    );
                }
                self.elapsed = Duration::ZERO;
                None
            }
            ChallengePolicy::FailFast => {
                self.outcome = ChallengeOutcome::Failure;
                tracing::debug!(value, "threshold challenge failed on low sample");
                Some(ChallengeOutcome::Failure)
            }
        }
    }

    /// Stop the attempt early. Returns `true` if it was still in progress.
    pub fn cancel(&mut self) -> bool {
        if self.outcome != ChallengeOutcome::InProgress {
            return false;
        }
        self.outcome = ChallengeOutcome::Failure;
        true
    }
}

pub(crate) fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
