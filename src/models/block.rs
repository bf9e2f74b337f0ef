//! Block model — a grouping of teams within one tournament phase.

use serde::{Deserialize, Serialize};

use super::{BlockId, EntityId, TeamId};

/// What kind of phase a block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Every team plays every other team; ranking comes from aggregate stats.
    RoundRobin,
    /// Single elimination; ranking positions are final placements.
    Elimination,
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseKind::RoundRobin => write!(f, "round_robin"),
            PhaseKind::Elimination => write!(f, "elimination"),
        }
    }
}

/// A set of teams and matches within one tournament phase.
///
/// Each block owns exactly one ranking snapshot, replaced as a whole on
/// every recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Unique identifier (derived from code + name)
    pub id: BlockId,

    /// Short label referenced by slot sources (e.g., "A").
    /// Must not be "W" or "L" — those prefixes are reserved for
    /// winner/loser slot labels.
    pub code: String,

    /// Display name (e.g., "Block A")
    pub name: String,

    /// Phase this block belongs to
    pub phase: PhaseKind,

    /// Teams belonging to this block
    pub team_ids: Vec<TeamId>,
}

impl Block {
    /// Create a new Block with auto-generated ID.
    pub fn new(code: impl Into<String>, name: impl Into<String>, phase: PhaseKind) -> Self {
        let code = code.into();
        let name = name.into();
        let id = EntityId::generate(&[&code, &name]);

        Self {
            id,
            code,
            name,
            phase,
            team_ids: Vec::new(),
        }
    }

    /// Builder method to set the member teams.
    pub fn with_teams(mut self, team_ids: Vec<TeamId>) -> Self {
        self.team_ids = team_ids;
        self
    }

    /// Whether the given team belongs to this block.
    pub fn has_team(&self, team_id: &TeamId) -> bool {
        self.team_ids.contains(team_id)
    }
}
