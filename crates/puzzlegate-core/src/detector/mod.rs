//! Seams for the mini-game collaborators.
//!
//! AR and NFC levels only ever produce a boolean success signal; the volume
//! level consumes a stream of audio level readings. Neither the camera, the
//! tag reader nor the microphone is touched here.

pub mod nfc;

use std::collections::VecDeque;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    Ar,
    Nfc,
}

impl std::fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectorKind::Ar => f.write_str("ar"),
            DetectorKind::Nfc => f.write_str("nfc"),
        }
    }
}

impl FromStr for DetectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ar" => Ok(DetectorKind::Ar),
            "nfc" => Ok(DetectorKind::Nfc),
            other => Err(format!("unknown detector: {other} (expected ar or nfc)")),
        }
    }
}

/// Opaque producer of a mini-game success signal.
pub trait SuccessDetector {
    fn kind(&self) -> DetectorKind;

    /// Returns `true` once per detected success.
    fn poll(&mut self) -> bool;
}

/// Stand-in for a "simulate success" button.
#[derive(Debug, Clone)]
pub struct ManualDetector {
    kind: DetectorKind,
    pressed: bool,
}

impl ManualDetector {
    pub fn new(kind: DetectorKind) -> Self {
        Self {
            kind,
            pressed: false,
        }
    }

    pub fn press(&mut self) {
        self.pressed = true;
    }
}

impl SuccessDetector for ManualDetector {
    fn kind(&self) -> DetectorKind {
        self.kind
    }

    fn poll(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }
}

/// Opaque producer of audio level readings, one per tick.
pub trait SignalSource {
    /// Next reading in dBFS, or `None` when the source is exhausted.
    fn next_level(&mut self) -> Option<f32>;
}

/// Replays a fixed list of readings.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSignal {
    levels: VecDeque<f32>,
}

impl ScriptedSignal {
    pub fn new(levels: impl IntoIterator<Item = f32>) -> Self {
        Self {
            levels: levels.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.levels.len()
    }
}

impl SignalSource for ScriptedSignal {
    fn next_level(&mut self) -> Option<f32> {
        self.levels.pop_front()
    }
}
