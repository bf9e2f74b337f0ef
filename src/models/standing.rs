//! Ranking snapshot models.
//!
//! A block owns exactly one snapshot. It is always replaced as a whole —
//! never patched per team — so readers can never observe a
//! partially-recomputed ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BlockId, TeamId};

/// One team's line in a block ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
    /// Team this line belongs to
    pub team_id: TeamId,

    /// Accumulated points
    pub points: u32,

    /// Matches played
    pub played: u32,

    pub wins: u32,
    pub draws: u32,
    pub losses: u32,

    /// Goals scored
    pub goals_for: u32,

    /// Goals conceded
    pub goals_against: u32,

    /// goals_for - goals_against
    pub goal_difference: i64,

    /// Rank within the block; 0 = unranked
    pub position: u32,

    /// Set when an operator placed this team by hand. Automatic position
    /// assignment never overwrites a manual one.
    #[serde(default)]
    pub manual_position: bool,

    /// Free-form operator note
    pub note: Option<String>,
}

impl TeamStanding {
    /// A zeroed standing for a team that has not played yet.
    pub fn empty(team_id: TeamId) -> Self {
        Self {
            team_id,
            points: 0,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            position: 0,
            manual_position: false,
            note: None,
        }
    }
}

/// The full ordered ranking of a block, with a version counter for
/// optimistic concurrency: a write only succeeds against the version it
/// was computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingSnapshot {
    /// Block this snapshot belongs to
    pub block_id: BlockId,

    /// Bumped by the store on every successful replace
    pub version: u64,

    /// Ordered standings; invariant: one entry per block team
    pub standings: Vec<TeamStanding>,

    /// When this snapshot was computed
    pub computed_at: DateTime<Utc>,
}

impl RankingSnapshot {
    /// An empty initial snapshot for a freshly created block.
    pub fn empty(block_id: BlockId) -> Self {
        Self {
            block_id,
            version: 0,
            standings: Vec::new(),
            computed_at: Utc::now(),
        }
    }

    /// The standing for a team, if present.
    pub fn standing_of(&self, team_id: &TeamId) -> Option<&TeamStanding> {
        self.standings.iter().find(|s| &s.team_id == team_id)
    }

    /// The team at a ranked position, but only when exactly one team holds
    /// it. A vacant or tie-shared position resolves to nothing — promoting
    /// out of an ambiguous position would pick a team arbitrarily.
    pub fn unique_team_at(&self, position: u32) -> Option<&TeamStanding> {
        if position == 0 {
            return None;
        }
        let mut found = None;
        for standing in &self.standings {
            if standing.position == position {
                if found.is_some() {
                    return None;
                }
                found = Some(standing);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityId;

    fn standing(team: &str, position: u32) -> TeamStanding {
        TeamStanding {
            position,
            ..TeamStanding::empty(EntityId::from(team))
        }
    }

    #[test]
    fn test_empty_standing() {
        let s = TeamStanding::empty(EntityId::from("t-1"));
        assert_eq!(s.points, 0);
        assert_eq!(s.position, 0);
        assert!(!s.manual_position);
    }

    #[test]
    fn test_unique_team_at() {
        let snapshot = RankingSnapshot {
            standings: vec![standing("t-1", 1), standing("t-2", 2), standing("t-3", 3)],
            ..RankingSnapshot::empty(EntityId::from("block-a"))
        };

        let first = snapshot.unique_team_at(1).unwrap();
        assert_eq!(first.team_id, EntityId::from("t-1"));
        assert!(snapshot.unique_team_at(4).is_none());
    }

    #[test]
    fn test_shared_position_is_ambiguous() {
        let snapshot = RankingSnapshot {
            standings: vec![standing("t-1", 1), standing("t-2", 1), standing("t-3", 3)],
            ..RankingSnapshot::empty(EntityId::from("block-a"))
        };

        assert!(snapshot.unique_team_at(1).is_none());
        assert!(snapshot.unique_team_at(3).is_some());
    }

    #[test]
    fn test_position_zero_never_resolves() {
        let snapshot = RankingSnapshot {
            standings: vec![standing("t-1", 0)],
            ..RankingSnapshot::empty(EntityId::from("block-a"))
        };

        assert!(snapshot.unique_team_at(0).is_none());
    }

    #[test]
    fn test_standing_of() {
        let snapshot = RankingSnapshot {
            standings: vec![standing("t-1", 1), standing("t-2", 2)],
            ..RankingSnapshot::empty(EntityId::from("block-a"))
        };

        assert!(snapshot.standing_of(&EntityId::from("t-2")).is_some());
        assert!(snapshot.standing_of(&EntityId::from("t-9")).is_none());
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = RankingSnapshot {
            standings: vec![standing("t-1", 1)],
            ..RankingSnapshot::empty(EntityId::from("block-a"))
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let deserialized: RankingSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.standings.len(), 1);
        assert_eq!(deserialized.version, 0);
    }
}
