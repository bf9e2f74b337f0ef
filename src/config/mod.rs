//! Rule configuration loading and validation.
//!
//! Sport code, point values, walkover goal values, and the tie-break chain
//! are supplied per tournament/phase by an external configuration source;
//! the engine only consumes them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{TieBreakCriterion, TieBreakEntry};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Points awarded per match outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointValues {
    #[serde(default = "default_win_points")]
    pub win: u32,

    #[serde(default = "default_draw_points")]
    pub draw: u32,

    #[serde(default)]
    pub loss: u32,
}

fn default_win_points() -> u32 {
    3
}

fn default_draw_points() -> u32 {
    1
}

impl Default for PointValues {
    fn default() -> Self {
        Self {
            win: default_win_points(),
            draw: default_draw_points(),
            loss: 0,
        }
    }
}

/// Goal values substituted for both sides of a walkover match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WalkoverGoals {
    #[serde(default = "default_walkover_winner")]
    pub winner: u32,

    #[serde(default)]
    pub loser: u32,
}

fn default_walkover_winner() -> u32 {
    3
}

impl Default for WalkoverGoals {
    fn default() -> Self {
        Self {
            winner: default_walkover_winner(),
            loser: 0,
        }
    }
}

/// The criteria a sport permits in its tie-break chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportRules {
    /// Sport code (e.g., "football")
    pub code: String,

    /// Criteria this sport's chains may use
    pub allowed_criteria: Vec<TieBreakCriterion>,
}

impl SportRules {
    /// Rules for a sport code. Unknown codes get the permissive default
    /// (all criteria allowed).
    pub fn for_code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            allowed_criteria: TieBreakCriterion::ALL.to_vec(),
        }
    }

    /// Whether the given criterion is allowed.
    pub fn allows(&self, criterion: TieBreakCriterion) -> bool {
        self.allowed_criteria.contains(&criterion)
    }
}

fn default_sport() -> String {
    "football".to_string()
}

/// Main rule configuration for one tournament phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Sport code, selects the allowed criterion set
    #[serde(default = "default_sport")]
    pub sport: String,

    #[serde(default)]
    pub points: PointValues,

    #[serde(default)]
    pub walkover: WalkoverGoals,

    /// Configured tie-break chain. Empty means the built-in default order
    /// (points, goal difference, goals for) applies.
    #[serde(default)]
    pub tiebreak: Vec<TieBreakEntry>,

    /// Criteria the sport permits; defaults to all known criteria
    #[serde(default)]
    pub allowed_criteria: Option<Vec<TieBreakCriterion>>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            sport: default_sport(),
            points: PointValues::default(),
            walkover: WalkoverGoals::default(),
            tiebreak: Vec::new(),
            allowed_criteria: None,
        }
    }
}

impl RuleConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: RuleConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// The sport rules this configuration resolves to.
    pub fn sport_rules(&self) -> SportRules {
        match &self.allowed_criteria {
            Some(criteria) => SportRules {
                code: self.sport.clone(),
                allowed_criteria: criteria.clone(),
            },
            None => SportRules::for_code(self.sport.clone()),
        }
    }

    /// Validate the configuration. Chain-specific validation (entry count,
    /// duplicates, order sequence) happens in `calculate::tiebreak` where
    /// the chain is built; this checks the config shape itself.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sport.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "sport code must not be empty".to_string(),
            ));
        }

        if self.points.win < self.points.draw {
            return Err(ConfigError::ValidationError(
                "win points must not be lower than draw points".to_string(),
            ));
        }

        if let Some(criteria) = &self.allowed_criteria {
            if criteria.is_empty() {
                return Err(ConfigError::ValidationError(
                    "allowed_criteria must not be empty when set".to_string(),
                ));
            }
            let unique: HashSet<_> = criteria.iter().collect();
            if unique.len() != criteria.len() {
                return Err(ConfigError::ValidationError(
                    "allowed_criteria contains duplicates".to_string(),
                ));
            }
        }

        Ok(())
    }
}
