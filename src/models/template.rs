//! Bracket templates — symbolic slot sources and placement metadata.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use super::TeamId;

/// Error parsing a symbolic slot label.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid slot label: {0}")]
pub struct SlotParseError(pub String);

/// Where one side of an elimination match gets its team from.
///
/// Textual labels: `"A_1"` (block A, position 1), `"W_M3"` / `"L_M3"`
/// (winner / loser of match M3). The `W_`/`L_` prefixes are reserved, so a
/// block code must not be the single letter "W" or "L".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlotSource {
    /// The team ranked at `position` in the block with `block_code`
    BlockPosition { block_code: String, position: u32 },

    /// The winner of the referenced match
    WinnerOf { match_code: String },

    /// The loser of the referenced match
    LoserOf { match_code: String },

    /// A fixed, pre-assigned team
    Fixed { team_id: TeamId },
}

impl SlotSource {
    /// Whether this source must be resolved against standings or prior
    /// results (as opposed to a fixed team).
    pub fn is_symbolic(&self) -> bool {
        !matches!(self, SlotSource::Fixed { .. })
    }

    /// The display label a slot shows until promotion fills it.
    pub fn label(&self) -> String {
        match self {
            SlotSource::BlockPosition {
                block_code,
                position,
            } => format!("{}_{}", block_code, position),
            SlotSource::WinnerOf { match_code } => format!("W_{}", match_code),
            SlotSource::LoserOf { match_code } => format!("L_{}", match_code),
            SlotSource::Fixed { team_id } => team_id.to_string(),
        }
    }

    /// The block code this source reads from, if any.
    pub fn block_code(&self) -> Option<&str> {
        match self {
            SlotSource::BlockPosition { block_code, .. } => Some(block_code),
            _ => None,
        }
    }

    /// The match code this source reads from, if any.
    pub fn feeder_match(&self) -> Option<&str> {
        match self {
            SlotSource::WinnerOf { match_code } | SlotSource::LoserOf { match_code } => {
                Some(match_code)
            }
            _ => None,
        }
    }
}

impl FromStr for SlotSource {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(code) = s.strip_prefix("W_") {
            if code.is_empty() {
                return Err(SlotParseError(s.to_string()));
            }
            return Ok(SlotSource::WinnerOf {
                match_code: code.to_string(),
            });
        }
        if let Some(code) = s.strip_prefix("L_") {
            if code.is_empty() {
                return Err(SlotParseError(s.to_string()));
            }
            return Ok(SlotSource::LoserOf {
                match_code: code.to_string(),
            });
        }

        // "<block>_<position>", splitting on the last underscore so block
        // codes may themselves contain underscores.
        let (block_code, position) = s.rsplit_once('_').ok_or_else(|| SlotParseError(s.to_string()))?;
        if block_code.is_empty() {
            return Err(SlotParseError(s.to_string()));
        }
        let position: u32 = position.parse().map_err(|_| SlotParseError(s.to_string()))?;
        if position == 0 {
            return Err(SlotParseError(s.to_string()));
        }

        Ok(SlotSource::BlockPosition {
            block_code: block_code.to_string(),
            position,
        })
    }
}

impl std::fmt::Display for SlotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Template for one elimination match: where each side comes from, and
/// which final placements the match decides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchTemplate {
    /// Code of the match this template governs (e.g., "M7")
    pub match_code: String,

    /// Source for the home side
    pub home_source: SlotSource,

    /// Source for the away side
    pub away_source: SlotSource,

    /// Final placement written to the winner, if this match decides one
    pub winner_position: Option<u32>,

    /// Final placement written to the loser
    pub loser_position_start: Option<u32>,

    /// When it differs from the start, losers of several matches in the
    /// round all share `loser_position_start` (competition-ranking ties)
    pub loser_position_end: Option<u32>,
}

impl MatchTemplate {
    /// Create a template with no placement metadata.
    pub fn new(match_code: impl Into<String>, home_source: SlotSource, away_source: SlotSource) -> Self {
        Self {
            match_code: match_code.into(),
            home_source,
            away_source,
            winner_position: None,
            loser_position_start: None,
            loser_position_end: None,
        }
    }

    /// Builder method to set placement metadata.
    pub fn with_placements(
        mut self,
        winner_position: Option<u32>,
        loser_position_start: Option<u32>,
        loser_position_end: Option<u32>,
    ) -> Self {
        self.winner_position = winner_position;
        self.loser_position_start = loser_position_start;
        self.loser_position_end = loser_position_end;
        self
    }

    /// Whether this template decides any final placements.
    pub fn has_placements(&self) -> bool {
        self.winner_position.is_some() || self.loser_position_start.is_some()
    }

    /// Whether any side of this template reads from the given block.
    pub fn references_block(&self, block_code: &str) -> bool {
        self.home_source.block_code() == Some(block_code)
            || self.away_source.block_code() == Some(block_code)
    }

    /// Whether any side of this template reads from the given match.
    pub fn references_match(&self, match_code: &str) -> bool {
        self.home_source.feeder_match() == Some(match_code)
            || self.away_source.feeder_match() == Some(match_code)
    }
}
