//! Line-driven game loop.
//!
//! Each input line is one player action; each produces exactly one JSON
//! line on stdout, either an event or `{"error": ..., "kind": ...}`.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use puzzlegate_core::{DetectorKind, Event, GameError, GameSession};
use serde_json::json;

use super::load_config;

#[derive(Debug, Clone, PartialEq)]
enum PlayCommand {
    Start,
    Secret(String),
    Challenge,
    Sample { value: f32, dt_ms: Option<u64> },
    Leave,
    Detect(DetectorKind),
    Advance,
    Home,
    Status,
    Quit,
}

impl FromStr for PlayCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        match word {
            "start" => Ok(PlayCommand::Start),
            // The secret is the rest of the line, taken verbatim.
            "secret" => Ok(PlayCommand::Secret(rest.to_string())),
            "challenge" => Ok(PlayCommand::Challenge),
            "sample" => {
                let mut args = rest.split_whitespace();
                let value = args
                    .next()
                    .ok_or("usage: sample <db> [dt_ms]")?
                    .parse::<f32>()
                    .map_err(|e| format!("invalid level: {e}"))?;
                let dt_ms = args
                    .next()
                    .map(|s| s.parse::<u64>().map_err(|e| format!("invalid dt_ms: {e}")))
                    .transpose()?;
                Ok(PlayCommand::Sample { value, dt_ms })
            }
            "leave" => Ok(PlayCommand::Leave),
            "detect" => Ok(PlayCommand::Detect(rest.trim().parse()?)),
            "advance" => Ok(PlayCommand::Advance),
            "home" => Ok(PlayCommand::Home),
            "status" => Ok(PlayCommand::Status),
            "quit" | "exit" => Ok(PlayCommand::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

fn error_kind(err: &GameError) -> &'static str {
    match err {
        GameError::WrongSecret { .. } => "wrong_secret",
        GameError::InvalidTransition { .. } => "invalid_transition",
        GameError::ChallengeAbandoned { .. } => "challenge_abandoned",
        GameError::NoActiveChallenge => "no_active_challenge",
        GameError::GateMismatch { .. } => "gate_mismatch",
    }
}

fn dispatch(session: &mut GameSession, command: PlayCommand) -> Result<Event, GameError> {
    match command {
        PlayCommand::Start => session.start(),
        PlayCommand::Secret(secret) => session.submit_secret(&secret),
        PlayCommand::Challenge => session.enter_challenge(),
        PlayCommand::Sample { value, dt_ms: None } => session.sample_tick(value),
        PlayCommand::Sample {
            value,
            dt_ms: Some(ms),
        } => session.sample(value, Duration::from_millis(ms)),
        PlayCommand::Leave => session.leave_challenge(),
        PlayCommand::Detect(kind) => session.report_detector_success(kind),
        PlayCommand::Advance => session.advance(),
        PlayCommand::Home => Ok(session.home()),
        PlayCommand::Status | PlayCommand::Quit => Ok(session.snapshot()),
    }
}

/// Run commands from `input` until it ends or `quit` is read.
fn run_loop<R: BufRead, W: Write>(
    session: &mut GameSession,
    input: R,
    mut output: W,
) -> Result<(), Box<dyn std::error::Error>> {
    for line in input.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let response = match line.trim_start().parse::<PlayCommand>() {
            Ok(PlayCommand::Quit) => break,
            Ok(command) => match dispatch(session, command) {
                Ok(event) => serde_json::to_value(&event)?,
                Err(err) => {
                    tracing::debug!(%err, "command rejected");
                    json!({ "error": err.to_string(), "kind": error_kind(&err) })
                }
            },
            Err(message) => json!({ "error": message, "kind": "parse" }),
        };
        writeln!(output, "{}", serde_json::to_string(&response)?)?;
        output.flush()?;
    }
    Ok(())
}

pub fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let mut session = GameSession::from_config(&config)?;
    tracing::info!(levels = config.levels.len(), "session started");

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_loop(&mut session, stdin.lock(), stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzlegate_core::Config;

    fn play(script: &str) -> Vec<serde_json::Value> {
        let mut session = GameSession::from_config(&Config::default()).unwrap();
        let mut out = Vec::new();
        run_loop(&mut session, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!("start".parse::<PlayCommand>(), Ok(PlayCommand::Start));
        assert_eq!(
            "secret 04 18".parse::<PlayCommand>(),
            Ok(PlayCommand::Secret("04 18".into()))
        );
        assert_eq!(
            "sample -15.5 50".parse::<PlayCommand>(),
            Ok(PlayCommand::Sample {
                value: -15.5,
                dt_ms: Some(50)
            })
        );
        assert_eq!(
            "detect nfc".parse::<PlayCommand>(),
            Ok(PlayCommand::Detect(DetectorKind::Nfc))
        );
        assert!("sample".parse::<PlayCommand>().is_err());
        assert!("jump".parse::<PlayCommand>().is_err());
    }

    #[test]
    fn one_response_per_command() {
        let out = play("start\n\n# comment\nsecret nope\nsecret 0418\nadvance\nquit\nstatus\n");
        assert_eq!(out.len(), 4);
        assert_eq!(out[0]["type"], "level_shown");
        assert_eq!(out[1]["kind"], "wrong_secret");
        assert_eq!(out[2]["type"], "level_unlocked");
        assert_eq!(out[3]["level"], 2);
    }

    #[test]
    fn volume_level_via_samples() {
        let mut script = String::from("start\nsecret 0418\nadvance\nchallenge\n");
        for _ in 0..10 {
            script.push_str("sample -10\n");
        }
        script.push_str("leave\nstatus\n");
        let out = play(&script);
        assert_eq!(out[3]["type"], "challenge_started");
        assert_eq!(out[12]["type"], "challenge_progress");
        assert_eq!(out[13]["type"], "challenge_succeeded");
        assert_eq!(out[14]["type"], "challenge_closed");
        assert_eq!(out[15]["progression"]["unlocked_levels"], json!([1, 2]));
    }

    #[test]
    fn errors_are_reported_not_fatal() {
        let out = play("sample 0\nbogus\nstart\nchallenge\nleave\n");
        assert_eq!(out[0]["kind"], "no_active_challenge");
        assert_eq!(out[1]["kind"], "parse");
        assert_eq!(out[2]["type"], "level_shown");
        assert_eq!(out[3]["kind"], "gate_mismatch");
        assert_eq!(out[4]["kind"], "no_active_challenge");
    }
}
