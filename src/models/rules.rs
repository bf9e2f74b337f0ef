//! Tie-break rule data: criteria and ordered chain entries.

use serde::{Deserialize, Serialize};

/// A single criterion usable in a tie-break chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakCriterion {
    Points,
    GoalDifference,
    GoalsFor,
    Wins,
    /// Points, then goal difference, then goals for — recomputed over only
    /// the matches among the currently tied teams.
    HeadToHead,
    /// Deliberate non-resolution marker: teams still level here stay tied
    /// and are handed to an operator. Never resolved automatically.
    Lottery,
}

impl TieBreakCriterion {
    /// All known criteria.
    pub const ALL: [TieBreakCriterion; 6] = [
        TieBreakCriterion::Points,
        TieBreakCriterion::GoalDifference,
        TieBreakCriterion::GoalsFor,
        TieBreakCriterion::Wins,
        TieBreakCriterion::HeadToHead,
        TieBreakCriterion::Lottery,
    ];
}

impl std::fmt::Display for TieBreakCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TieBreakCriterion::Points => write!(f, "points"),
            TieBreakCriterion::GoalDifference => write!(f, "goal_difference"),
            TieBreakCriterion::GoalsFor => write!(f, "goals_for"),
            TieBreakCriterion::Wins => write!(f, "wins"),
            TieBreakCriterion::HeadToHead => write!(f, "head_to_head"),
            TieBreakCriterion::Lottery => write!(f, "lottery"),
        }
    }
}

/// One `{criterion, order}` pair of a configured chain. Orders must form a
/// contiguous 1..N sequence; validation lives in `calculate::tiebreak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieBreakEntry {
    pub criterion: TieBreakCriterion,
    pub order: u8,
}

impl TieBreakEntry {
    pub fn new(criterion: TieBreakCriterion, order: u8) -> Self {
        Self { criterion, order }
    }
}
