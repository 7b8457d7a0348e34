//! Configurable parameters of a volume challenge.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ChallengePolicy, ThresholdChallenge};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeSpec {
    #[serde(default = "default_required_level_db")]
    pub required_level_db: f32,
    #[serde(default = "default_required_duration_ms")]
    pub required_duration_ms: u64,
    /// Sampling cadence the presentation layer drives `sample()` at.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub policy: ChallengePolicy,
}

fn default_required_level_db() -> f32 {
    -30.0
}
fn default_required_duration_ms() -> u64 {
    1000
}
fn default_tick_interval_ms() -> u64 {
    100
}

impl Default for ChallengeSpec {
    fn default() -> Self {
        Self {
            required_level_db: default_required_level_db(),
            required_duration_ms: default_required_duration_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            policy: ChallengePolicy::default(),
        }
    }
}

impl ChallengeSpec {
    pub fn required_duration(&self) -> Duration {
        Duration::from_millis(self.required_duration_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Number of consecutive qualifying ticks needed to succeed.
    pub fn required_ticks(&self) -> u64 {
        if self.tick_interval_ms == 0 {
            return 0;
        }
        self.required_duration_ms.div_ceil(self.tick_interval_ms)
    }

    pub fn build(&self) -> ThresholdChallenge {
        ThresholdChallenge::new(self.required_level_db, self.required_duration(), self.policy)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.required_level_db.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: "required_level_db".into(),
                message: "must be a finite number".into(),
            });
        }
        if self.required_duration_ms == 0 {
            return Err(ValidationError::InvalidValue {
                field: "required_duration_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ValidationError::InvalidValue {
                field: "tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}
