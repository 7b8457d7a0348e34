use std::path::Path;

use clap::Subcommand;
use puzzlegate_core::Config;

use super::{load_config, save_config};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "levels.0.gate.expected", "feedback.celebration_delay_ms")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Print the config file location
    Path,
}

pub fn run(path: Option<&Path>, action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = load_config(path)?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = load_config(path)?;
            config.set(&key, &value)?;
            save_config(path, &config)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = load_config(path)?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            save_config(path, &Config::default())?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => {
            let resolved = match path {
                Some(p) => p.to_path_buf(),
                None => Config::default_path()?,
            };
            println!("{}", resolved.display());
        }
    }
    Ok(())
}
