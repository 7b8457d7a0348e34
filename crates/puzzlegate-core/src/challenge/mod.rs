mod meter;
mod spec;
mod threshold;

pub use meter::{MeterTone, VolumeMeter};
pub use spec::ChallengeSpec;
pub use threshold::{ChallengeOutcome, ChallengePolicy, ChallengeSnapshot, ThresholdChallenge};
pub(crate) use threshold::duration_ms;
