pub mod challenge;
pub mod config;
pub mod play;

use std::path::Path;

use puzzlegate_core::{Config, ConfigError};

/// Load the config from `path`, or the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

pub fn save_config(path: Option<&Path>, config: &Config) -> Result<(), ConfigError> {
    match path {
        Some(path) => config.save_to(path),
        None => config.save(),
    }
}
