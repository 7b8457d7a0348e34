//! How each level is unlocked.

use serde::{Deserialize, Serialize};

use crate::challenge::ChallengeSpec;
use crate::detector::DetectorKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LevelGate {
    /// Password entry compared by exact string equality.
    Secret { expected: String },
    /// Hold the microphone level above a threshold for a duration.
    Volume {
        #[serde(default)]
        challenge: ChallengeSpec,
    },
    /// An AR or NFC mini-game reports success.
    Detector { detector: DetectorKind },
}

/// Gate type without its parameters, safe to show to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    Secret,
    Volume,
    Ar,
    Nfc,
}

impl LevelGate {
    pub fn kind(&self) -> GateKind {
        match self {
            LevelGate::Secret { .. } => GateKind::Secret,
            LevelGate::Volume { .. } => GateKind::Volume,
            LevelGate::Detector {
                detector: DetectorKind::Ar,
            } => GateKind::Ar,
            LevelGate::Detector {
                detector: DetectorKind::Nfc,
            } => GateKind::Nfc,
        }
    }

    pub fn secret(expected: impl Into<String>) -> Self {
        LevelGate::Secret {
            expected: expected.into(),
        }
    }

    pub fn volume(challenge: ChallengeSpec) -> Self {
        LevelGate::Volume { challenge }
    }

    pub fn detector(detector: DetectorKind) -> Self {
        LevelGate::Detector { detector }
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GateKind::Secret => "secret",
            GateKind::Volume => "volume",
            GateKind::Ar => "ar",
            GateKind::Nfc => "nfc",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_hides_parameters() {
        assert_eq!(LevelGate::secret("0418").kind(), GateKind::Secret);
        assert_eq!(
            LevelGate::volume(ChallengeSpec::default()).kind(),
            GateKind::Volume
        );
        assert_eq!(LevelGate::detector(DetectorKind::Nfc).kind(), GateKind::Nfc);
    }

    #[test]
    fn gate_serializes_with_kind_tag() {
        let json = serde_json::to_value(LevelGate::detector(DetectorKind::Ar)).unwrap();
        assert_eq!(json["kind"], "detector");
        assert_eq!(json["detector"], "ar");
    }

    #[test]
    fn volume_gate_fills_missing_challenge_fields() {
        let gate: LevelGate =
            serde_json::from_str(r#"{"kind":"volume","challenge":{"required_level_db":-20.0}}"#)
                .unwrap();
        match gate {
            LevelGate::Volume { challenge } => {
                assert_eq!(challenge.required_level_db, -20.0);
                assert_eq!(challenge.required_duration_ms, 1000);
            }
            other => panic!("Expected volume gate, got {other:?}"),
        }
    }
}
