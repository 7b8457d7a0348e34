//! Volume meter mapping for the challenge screen.
//!
//! Audio levels arrive as average power in dBFS (0 is full scale, quieter is
//! more negative). The meter fills linearly from `floor_db` up to 0 dB.

use serde::{Deserialize, Serialize};

use super::ThresholdChallenge;

/// Meter color relative to the challenge threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeterTone {
    /// At or above the threshold (drawn green)
    Above,
    /// Below the threshold (drawn orange)
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeMeter {
    /// Level that renders as an empty meter.
    pub floor_db: f32,
}

impl Default for VolumeMeter {
    fn default() -> Self {
        Self { floor_db: -50.0 }
    }
}

impl VolumeMeter {
    pub fn new(floor_db: f32) -> Self {
        Self { floor_db }
    }

    /// 0.0 .. 1.0 fill for a reading.
    pub fn fill(&self, level_db: f32) -> f32 {
        if self.floor_db >= 0.0 || level_db.is_nan() {
            return 0.0;
        }
        ((level_db - self.floor_db) / -self.floor_db).clamp(0.0, 1.0)
    }

    pub fn tone(&self, challenge: &ThresholdChallenge, level_db: f32) -> MeterTone {
        if challenge.is_above_threshold(level_db) {
            MeterTone::Above
        } else {
            MeterTone::Below
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::ChallengePolicy;
    use std::time::Duration;

    #[test]
    fn fill_is_linear_between_floor_and_full_scale() {
        let meter = VolumeMeter::default();
        assert_eq!(meter.fill(-50.0), 0.0);
        assert_eq!(meter.fill(-25.0), 0.5);
        assert_eq!(meter.fill(0.0), 1.0);
    }

    #[test]
    fn fill_clamps_out_of_range_levels() {
        let meter = VolumeMeter::default();
        assert_eq!(meter.fill(-120.0), 0.0);
        assert_eq!(meter.fill(6.0), 1.0);
        assert_eq!(meter.fill(f32::NAN), 0.0);
    }

    #[test]
    fn tone_follows_threshold() {
        let meter = VolumeMeter::default();
        let challenge =
            ThresholdChallenge::new(-30.0, Duration::from_secs(1), ChallengePolicy::StreakReset);
        assert_eq!(meter.tone(&challenge, -30.0), MeterTone::Above);
        assert_eq!(meter.tone(&challenge, -31.0), MeterTone::Below);
    }
}
