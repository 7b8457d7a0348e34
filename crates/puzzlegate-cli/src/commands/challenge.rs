use std::path::Path;

use clap::{Args, ValueEnum};
use puzzlegate_core::{
    ChallengeOutcome, ChallengePolicy, ChallengeSpec, ScriptedSignal, SignalSource,
};
use serde::Serialize;

use super::load_config;

/// Exit code when the readings do not complete the challenge.
const EXIT_NOT_SUCCEEDED: i32 = 2;

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// A low reading restarts the streak
    StreakReset,
    /// A low reading fails the attempt
    FailFast,
}

impl From<PolicyArg> for ChallengePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::StreakReset => ChallengePolicy::StreakReset,
            PolicyArg::FailFast => ChallengePolicy::FailFast,
        }
    }
}

#[derive(Args)]
pub struct ChallengeArgs {
    /// Readings in dBFS, comma separated (e.g. --samples=-15,-15,-25)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    samples: Vec<f32>,
    /// Time covered by each reading (defaults to the configured tick)
    #[arg(long)]
    dt_ms: Option<u64>,
    /// Required level in dBFS (defaults to the configured volume level)
    #[arg(long, allow_hyphen_values = true)]
    threshold: Option<f32>,
    /// How long the level must be held
    #[arg(long)]
    duration_ms: Option<u64>,
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,
}

#[derive(Serialize)]
struct ChallengeSummary {
    outcome: ChallengeOutcome,
    policy: ChallengePolicy,
    required_level_db: f32,
    required_duration_ms: u64,
    tick_interval_ms: u64,
    elapsed_ms: u64,
    progress: f64,
    samples_used: u32,
    samples_total: usize,
}

pub fn run(
    config_path: Option<&Path>,
    args: ChallengeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let mut spec = config
        .volume_challenge()
        .cloned()
        .unwrap_or_else(ChallengeSpec::default);
    if let Some(threshold) = args.threshold {
        spec.required_level_db = threshold;
    }
    if let Some(duration_ms) = args.duration_ms {
        spec.required_duration_ms = duration_ms;
    }
    if let Some(dt_ms) = args.dt_ms {
        spec.tick_interval_ms = dt_ms;
    }
    if let Some(policy) = args.policy {
        spec.policy = policy.into();
    }
    spec.validate()?;

    let samples_total = args.samples.len();
    let mut source = ScriptedSignal::new(args.samples);
    let mut challenge = spec.build();
    let dt = spec.tick_interval();
    while !challenge.current_outcome().is_finished() {
        let Some(value) = source.next_level() else {
            break;
        };
        challenge.sample(value, dt);
    }
    tracing::debug!(
        outcome = ?challenge.current_outcome(),
        unused = source.remaining(),
        "challenge simulation finished"
    );

    let snapshot = challenge.snapshot();
    let summary = ChallengeSummary {
        outcome: snapshot.outcome,
        policy: snapshot.policy,
        required_level_db: snapshot.required_level_db,
        required_duration_ms: snapshot.required_duration_ms,
        tick_interval_ms: spec.tick_interval_ms,
        elapsed_ms: snapshot.elapsed_ms,
        progress: snapshot.progress,
        samples_used: snapshot.samples_seen,
        samples_total,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if summary.outcome != ChallengeOutcome::Success {
        std::process::exit(EXIT_NOT_SUCCEEDED);
    }
    Ok(())
}
