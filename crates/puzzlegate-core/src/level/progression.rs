//! Level progression and unlock state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Home --start--> Level(1) --advance--> Level(2) ... Level(N)
//!   ^                |                     |
//!   +------home------+---------home--------+
//! ```
//!
//! `advance` requires the displayed level to be unlocked, so a level `n > 1`
//! is only ever shown after `n - 1` has been unlocked. Unlocks themselves are
//! accepted for any in-range level.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_LEVEL_COUNT: u8 = 4;

/// Which screen the player is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", content = "level", rename_all = "snake_case")]
pub enum Screen {
    Home,
    Level(u8),
}

/// Serializable view of the progression for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionSnapshot {
    pub screen: Screen,
    pub current_level: u8,
    pub level_count: u8,
    pub unlocked_levels: Vec<u8>,
    /// Level whose last secret submission was wrong, if the prompt is showing.
    #[serde(default)]
    pub rejected: Option<u8>,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelProgression {
    level_count: u8,
    unlocked: BTreeSet<u8>,
    current_level: u8,
    screen: Screen,
    rejected: Option<u8>,
}

impl Default for LevelProgression {
    fn default() -> Self {
        Self::with_count(DEFAULT_LEVEL_COUNT)
    }
}

impl LevelProgression {
    /// Create a progression over levels `1..=level_count`.
    ///
    /// # Errors
    ///
    /// Returns an error if `level_count` is zero.
    pub fn new(level_count: u8) -> Result<Self, ValidationError> {
        if level_count == 0 {
            return Err(ValidationError::InvalidValue {
                field: "level_count".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(Self::with_count(level_count))
    }

    fn with_count(level_count: u8) -> Self {
        Self {
            level_count,
            unlocked: BTreeSet::new(),
            current_level: 1,
            screen: Screen::Home,
            rejected: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn level_count(&self) -> u8 {
        self.level_count
    }

    pub fn current_level(&self) -> u8 {
        self.current_level
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Unlocked levels in ascending order.
    pub fn unlocked_levels(&self) -> Vec<u8> {
        self.unlocked.iter().copied().collect()
    }

    pub fn is_unlocked(&self, level: u8) -> bool {
        self.unlocked.contains(&level)
    }

    /// Whether `level` may be displayed given the current unlocks.
    pub fn is_reachable(&self, level: u8) -> bool {
        self.in_range(level) && (level == 1 || self.is_unlocked(level - 1))
    }

    pub fn is_complete(&self) -> bool {
        self.is_unlocked(self.level_count)
    }

    pub fn rejected(&self) -> Option<u8> {
        self.rejected
    }

    pub fn snapshot(&self) -> ProgressionSnapshot {
        ProgressionSnapshot {
            screen: self.screen,
            current_level: self.current_level,
            level_count: self.level_count,
            unlocked_levels: self.unlocked_levels(),
            rejected: self.rejected,
            complete: self.is_complete(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Leave the home screen for the current level.
    ///
    /// Returns `false` if a level is already showing.
    pub fn start(&mut self) -> bool {
        match self.screen {
            Screen::Home => {
                self.screen = Screen::Level(self.current_level);
                tracing::debug!(level = self.current_level, "level shown");
                true
            }
            Screen::Level(_) => false,
        }
    }

    /// Unlock `level` iff `submitted == expected` (exact comparison).
    ///
    /// A mismatch leaves the unlocked set and current level untouched and only
    /// raises the transient "incorrect password" flag.
    pub fn attempt_unlock(&mut self, level: u8, submitted: &str, expected: &str) -> bool {
        if !self.in_range(level) {
            return false;
        }
        if submitted != expected {
            self.rejected = Some(level);
            tracing::warn!(level, "incorrect secret submitted");
            return false;
        }
        if self.rejected == Some(level) {
            self.rejected = None;
        }
        self.insert(level);
        true
    }

    /// Unlock `level` unconditionally. Returns `true` if it was newly unlocked.
    pub fn unlock_by_challenge(&mut self, level: u8) -> bool {
        if !self.in_range(level) {
            return false;
        }
        self.insert(level)
    }

    /// Move to the next level if the current one is unlocked and not last,
    /// and show it.
    pub fn advance(&mut self) -> bool {
        if !self.is_unlocked(self.current_level) || self.current_level >= self.level_count {
            return false;
        }
        self.current_level += 1;
        self.screen = Screen::Level(self.current_level);
        self.rejected = None;
        tracing::debug!(level = self.current_level, "advanced");
        true
    }

    /// Return to the home screen, keeping this session's unlocks.
    pub fn reset_to_home(&mut self) {
        self.current_level = 1;
        self.screen = Screen::Home;
        self.rejected = None;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn in_range(&self, level: u8) -> bool {
        (1..=self.level_count).contains(&level)
    }

    fn insert(&mut self, level: u8) -> bool {
        let inserted = self.unlocked.insert(level);
        if inserted {
            tracing::info!(level, complete = self.is_complete(), "level unlocked");
        }
        inserted
    }
}
