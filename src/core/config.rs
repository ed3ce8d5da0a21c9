//! Autoresolve configuration with documented defaults
//!
//! Loaded from TOML; every field falls back to its default when omitted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{AutoResolveError, Result};
use crate::core::types::{Round, SkillLevel};

/// Seed used when the configuration does not name one
pub const DEFAULT_SEED: u64 = 0x5eed_a070;

/// Options for a single scenario resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoResolveConfig {
    // === TERMINATION ===
    /// Round limit. Reaching it forces victory evaluation on remaining strength.
    pub max_rounds: Round,

    /// Strength ratio the leading team needs at the round limit to be
    /// declared the winner; anything closer is a draw.
    pub decisive_strength_ratio: f32,

    // === RANDOMNESS ===
    /// Seed for the built-in engine and random bot rosters
    pub seed: Option<u64>,

    // === BOT SKILL ===
    /// Skill given to bot sides when no team-specific override applies
    pub default_bot_skill: SkillLevel,

    /// Override for bots on a different team than the human side
    pub enemy_skill: Option<SkillLevel>,

    /// Override for bots on the human side's team
    pub allied_skill: Option<SkillLevel>,

    // === ABSTRACT BATTLEFIELD ===
    /// Rows between the north (0) and south edges
    pub board_depth: i32,

    /// Maximum row distance at which formations can fire
    pub engagement_range: i32,
}

impl Default for AutoResolveConfig {
    fn default() -> Self {
        Self {
            max_rounds: 30,
            decisive_strength_ratio: 2.0,
            seed: None,
            default_bot_skill: SkillLevel::Regular,
            enemy_skill: None,
            allied_skill: None,
            board_depth: 17,
            engagement_range: 3,
        }
    }
}

impl AutoResolveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed to use, falling back to [`DEFAULT_SEED`]
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_rounds == 0 {
            return Err("max_rounds must be at least 1".into());
        }

        if self.board_depth < 2 {
            return Err(format!(
                "board_depth ({}) must be at least 2",
                self.board_depth
            ));
        }

        if self.engagement_range <= 0 {
            return Err(format!(
                "engagement_range ({}) must be positive",
                self.engagement_range
            ));
        }

        if self.decisive_strength_ratio < 1.0 {
            return Err(format!(
                "decisive_strength_ratio ({}) must be >= 1.0",
                self.decisive_strength_ratio
            ));
        }

        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AutoResolveConfig = toml::from_str(contents)?;
        config.validate().map_err(AutoResolveError::InvalidConfig)?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
