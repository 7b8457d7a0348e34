mod gate;
mod progression;

pub use gate::{GateKind, LevelGate};
pub use progression::{LevelProgression, ProgressionSnapshot, Screen, DEFAULT_LEVEL_COUNT};
