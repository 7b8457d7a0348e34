//! Core error types for puzzlegate-core.
//!
//! Game errors are all recoverable: the player retries the same operation.
//! Configuration errors come from loading, saving or editing the TOML file.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for puzzlegate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Gameplay errors
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Recoverable gameplay errors returned by [`crate::GameSession`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The submitted secret did not match the level's expected secret
    #[error("Incorrect password for level {level}. Please try again.")]
    WrongSecret { level: u8 },

    /// The operation's preconditions were not met; nothing changed
    #[error("Invalid transition: {reason}")]
    InvalidTransition { reason: String },

    /// The challenge was left before it succeeded
    #[error("Challenge for level {level} abandoned before success")]
    ChallengeAbandoned { level: u8 },

    /// A sample or leave arrived with no challenge screen open
    #[error("No challenge is active")]
    NoActiveChallenge,

    /// The current level is unlocked some other way
    #[error("Level {level} is not unlocked by {attempted}")]
    GateMismatch { level: u8, attempted: String },
}

impl GameError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        GameError::InvalidTransition {
            reason: reason.into(),
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// No home directory to place the config in
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidValue { field, message } => ConfigError::InvalidValue {
                key: field,
                message,
            },
            other => ConfigError::InvalidValue {
                key: "levels".into(),
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
