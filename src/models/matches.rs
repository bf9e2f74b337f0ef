//! Match model — a single fixture between two sides.
//!
//! A side holds either a concrete team or a placeholder label waiting for
//! promotion from a block ranking or an earlier bracket match.

use serde::{Deserialize, Serialize};

use super::{BlockId, EntityId, MatchId, TeamId};

/// Which side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    /// The opposite side.
    pub fn other(&self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Home => write!(f, "home"),
            Side::Away => write!(f, "away"),
        }
    }
}

/// Match lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchStatus::Scheduled => write!(f, "scheduled"),
            MatchStatus::Ongoing => write!(f, "ongoing"),
            MatchStatus::Completed => write!(f, "completed"),
            MatchStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A raw score value as it arrives from upstream records.
///
/// Legacy data carries scores as a plain integer, a delimiter-separated
/// string of per-period values, or nothing at all. This is the only place
/// the heterogeneity exists; the score normalizer resolves it once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum RawScore {
    Number(i64),
    Text(String),
    #[default]
    Absent,
}

/// One side of a match: a concrete team or an unpromoted placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSide {
    /// Concrete team, once promoted. `None` means the slot still shows the
    /// template placeholder.
    pub team_id: Option<TeamId>,

    /// Team name, or the symbolic source label (e.g., "A_1") while
    /// unpromoted.
    pub display_name: String,
}

impl MatchSide {
    /// A side holding a concrete team.
    pub fn team(team_id: TeamId, display_name: impl Into<String>) -> Self {
        Self {
            team_id: Some(team_id),
            display_name: display_name.into(),
        }
    }

    /// A side still showing its template placeholder label.
    pub fn placeholder(label: impl Into<String>) -> Self {
        Self {
            team_id: None,
            display_name: label.into(),
        }
    }

    /// Whether this side still shows the unresolved placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.team_id.is_none()
    }
}

/// A single match between two sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// Unique identifier (derived from block id + code)
    pub id: MatchId,

    /// Human-facing match code (e.g., "M7"), referenced by slot sources
    pub code: String,

    /// Block this match belongs to
    pub block_id: BlockId,

    /// Home side
    pub home: MatchSide,

    /// Away side
    pub away: MatchSide,

    /// Raw home score as recorded upstream
    #[serde(default)]
    pub home_score: RawScore,

    /// Raw away score as recorded upstream
    #[serde(default)]
    pub away_score: RawScore,

    /// Lifecycle status
    pub status: MatchStatus,

    /// Whether the result has been confirmed by a scorekeeper
    pub confirmed: bool,

    /// Whether the match ended in a draw
    #[serde(default)]
    pub draw: bool,

    /// Whether the match was decided without play
    #[serde(default)]
    pub walkover: bool,

    /// Winning team, once decided
    pub winner_id: Option<TeamId>,
}

impl Match {
    /// Create a new scheduled Match with auto-generated ID.
    pub fn new(code: impl Into<String>, block_id: BlockId, home: MatchSide, away: MatchSide) -> Self {
        let code = code.into();
        let id = EntityId::generate(&[block_id.as_str(), &code]);

        Self {
            id,
            code,
            block_id,
            home,
            away,
            home_score: RawScore::Absent,
            away_score: RawScore::Absent,
            status: MatchStatus::Scheduled,
            confirmed: false,
            draw: false,
            walkover: false,
            winner_id: None,
        }
    }

    /// Builder method to record a completed result.
    pub fn with_result(
        mut self,
        home_score: RawScore,
        away_score: RawScore,
        winner_id: Option<TeamId>,
    ) -> Self {
        self.home_score = home_score;
        self.away_score = away_score;
        self.winner_id = winner_id.clone();
        self.draw = winner_id.is_none();
        self.status = MatchStatus::Completed;
        self
    }

    /// Builder method to mark the result confirmed.
    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }

    /// Builder method to mark the match a walkover for the given team.
    pub fn walkover_for(mut self, winner_id: TeamId) -> Self {
        self.walkover = true;
        self.winner_id = Some(winner_id);
        self.draw = false;
        self.status = MatchStatus::Completed;
        self
    }

    /// Access a side.
    pub fn side(&self, side: Side) -> &MatchSide {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Mutable access to a side.
    pub fn side_mut(&mut self, side: Side) -> &mut MatchSide {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    /// Raw score for a side.
    pub fn score(&self, side: Side) -> &RawScore {
        match side {
            Side::Home => &self.home_score,
            Side::Away => &self.away_score,
        }
    }

    /// Whether the given team plays in this match.
    pub fn participates(&self, team_id: &TeamId) -> bool {
        self.home.team_id.as_ref() == Some(team_id) || self.away.team_id.as_ref() == Some(team_id)
    }

    /// Whether this match carries a countable result: confirmed, completed,
    /// not cancelled.
    pub fn has_confirmed_result(&self) -> bool {
        self.confirmed && self.status == MatchStatus::Completed
    }

    /// The losing team of a decided match, if both sides are concrete.
    pub fn loser_id(&self) -> Option<&TeamId> {
        let winner = self.winner_id.as_ref()?;
        let home = self.home.team_id.as_ref()?;
        let away = self.away.team_id.as_ref()?;
        if home == winner {
            Some(away)
        } else if away == winner {
            Some(home)
        } else {
            None
        }
    }
}
