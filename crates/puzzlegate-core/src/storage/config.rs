//! TOML-based game configuration.
//!
//! Stores:
//! - The ordered list of levels and how each one is unlocked
//! - Challenge feedback settings (success delay, meter floor)
//!
//! Configuration is stored at `~/.config/puzzlegate/config.toml` unless a
//! path is given explicitly. Game progress is never written here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::challenge::{ChallengeSpec, VolumeMeter};
use crate::detector::DetectorKind;
use crate::error::ConfigError;
use crate::level::LevelGate;

/// One level of the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default)]
    pub title: String,
    pub gate: LevelGate,
}

/// Presentation feedback around challenges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Delay between a challenge success and leaving its screen.
    #[serde(default = "default_celebration_delay_ms")]
    pub celebration_delay_ms: u64,
    /// Level that renders as an empty volume meter.
    #[serde(default = "default_meter_floor_db")]
    pub meter_floor_db: f32,
}

/// Game configuration.
///
/// Serialized to/from TOML at `~/.config/puzzlegate/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default = "default_levels")]
    pub levels: Vec<LevelConfig>,
}

// Default functions
fn default_celebration_delay_ms() -> u64 {
    1000
}
fn default_meter_floor_db() -> f32 {
    -50.0
}
fn default_levels() -> Vec<LevelConfig> {
    vec![
        LevelConfig {
            title: "Enter Password".into(),
            gate: LevelGate::secret("0418"),
        },
        LevelConfig {
            title: "Volume Challenge".into(),
            gate: LevelGate::volume(ChallengeSpec::default()),
        },
        LevelConfig {
            title: "AR Text".into(),
            gate: LevelGate::detector(DetectorKind::Ar),
        },
        LevelConfig {
            title: "NFC Tag Reader".into(),
            gate: LevelGate::detector(DetectorKind::Nfc),
        },
    ]
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            celebration_delay_ms: default_celebration_delay_ms(),
            meter_floor_db: default_meter_floor_db(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feedback: FeedbackConfig::default(),
            levels: default_levels(),
        }
    }
}

impl Config {
    fn child<'a>(current: &'a serde_json::Value, part: &str) -> Option<&'a serde_json::Value> {
        match current {
            serde_json::Value::Array(items) => items.get(part.parse::<usize>().ok()?),
            other => other.get(part),
        }
    }

    fn child_mut<'a>(
        current: &'a mut serde_json::Value,
        part: &str,
    ) -> Option<&'a mut serde_json::Value> {
        match current {
            serde_json::Value::Array(items) => items.get_mut(part.parse::<usize>().ok()?),
            other => other.get_mut(part),
        }
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = Self::child(current, part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let not_a_number = || invalid(format!("cannot parse '{value}' as number"));
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            let n = value.parse::<f64>().map_err(|_| not_a_number())?;
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(not_a_number)?
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = Self::child_mut(current, part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, fails
    /// validation, or the default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg = Self::from_toml(&content)?;
                tracing::debug!(path = %path.display(), levels = cfg.levels.len(), "config loaded");
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                tracing::info!(path = %path.display(), "wrote default config");
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Parse and validate TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML for this schema or
    /// fails validation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::default_path()?)
    }

    /// Persist to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    ///
    /// Array elements are addressed by index, e.g. `levels.0.gate.expected`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. The caller persists the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config fails validation. On error `self` is unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check level count and challenge parameters.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() || self.levels.len() > usize::from(u8::MAX) {
            return Err(ConfigError::InvalidValue {
                key: "levels".into(),
                message: format!("expected 1..={} levels, got {}", u8::MAX, self.levels.len()),
            });
        }
        for (index, level) in self.levels.iter().enumerate() {
            if let LevelGate::Volume { challenge } = &level.gate {
                challenge.validate().map_err(|e| ConfigError::InvalidValue {
                    key: format!("levels.{index}.gate.challenge"),
                    message: e.to_string(),
                })?;
            }
        }
        let floor = self.feedback.meter_floor_db;
        if floor.is_nan() || floor >= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "feedback.meter_floor_db".into(),
                message: "must be below 0 dB".into(),
            });
        }
        Ok(())
    }

    pub fn gates(&self) -> Vec<LevelGate> {
        self.levels.iter().map(|l| l.gate.clone()).collect()
    }

    pub fn meter(&self) -> VolumeMeter {
        VolumeMeter::new(self.feedback.meter_floor_db)
    }

    /// The first volume challenge configured, if any.
    pub fn volume_challenge(&self) -> Option<&ChallengeSpec> {
        self.levels.iter().find_map(|l| match &l.gate {
            LevelGate::Volume { challenge } => Some(challenge),
            _ => None,
        })
    }
}
