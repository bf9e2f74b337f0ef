//! Standings calculation.
//!
//! Aggregates per-team win/draw/loss/goal stats from a block's confirmed
//! matches and produces a fully ordered ranking using the tie-break chain.
//! Pure: takes the block's current teams and matches, returns a new
//! standings list — the caller replaces the snapshot as a whole.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::{PointValues, WalkoverGoals};
use crate::models::{Match, Side, Team, TeamId, TeamStanding};

use super::score;
use super::tiebreak::{rank_groups, TieBreakChain, TieBreakContext};

/// A group of teams the chain could not separate. Requires operator action
/// when the chain ends at the lottery marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieGroup {
    pub team_ids: Vec<TeamId>,
}

/// Result of a standings calculation.
#[derive(Debug, Clone)]
pub struct StandingsOutcome {
    /// Fully ordered standings, one entry per team
    pub standings: Vec<TeamStanding>,

    /// Groups still tied after a lottery-terminated chain
    pub unresolved: Vec<TieGroup>,
}

/// Per-team aggregate over a set of matches.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TeamTotals {
    pub points: u32,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
}

/// Accumulate one team's totals over the given matches. Matches the team
/// does not participate in, and matches without a confirmed result, are
/// skipped. Walkover matches substitute the configured goal values instead
/// of parsing scores.
pub(crate) fn team_totals(
    team_id: &TeamId,
    matches: &[&Match],
    points: &PointValues,
    walkover: &WalkoverGoals,
) -> TeamTotals {
    let mut totals = TeamTotals::default();

    for m in matches {
        if !m.has_confirmed_result() || !m.participates(team_id) {
            continue;
        }

        let is_winner = m.winner_id.as_ref() == Some(team_id);

        let (goals_for, goals_against) = if m.walkover {
            if is_winner {
                (walkover.winner, walkover.loser)
            } else {
                (walkover.loser, walkover.winner)
            }
        } else {
            let my_side = if m.home.team_id.as_ref() == Some(team_id) {
                Side::Home
            } else {
                Side::Away
            };
            let mine = score::normalize(m.score(my_side));
            let theirs = score::normalize(m.score(my_side.other()));
            (mine.total, theirs.total)
        };

        totals.played += 1;
        totals.goals_for += goals_for;
        totals.goals_against += goals_against;

        if m.draw || m.winner_id.is_none() {
            totals.draws += 1;
            totals.points += points.draw;
        } else if is_winner {
            totals.wins += 1;
            totals.points += points.win;
        } else {
            totals.losses += 1;
            totals.points += points.loss;
        }
    }

    totals.goal_difference = totals.goals_for as i64 - totals.goals_against as i64;
    totals
}

/// Calculate a block's full ranking.
///
/// Every team appears exactly once; teams with no confirmed matches stay at
/// position 0 (unranked). Positions follow competition ranking: a tied
/// group shares one position and the next distinct group's position skips
/// ahead by the group size.
pub fn calculate(
    teams: &[Team],
    matches: &[Match],
    points: &PointValues,
    walkover: &WalkoverGoals,
    chain: Option<&TieBreakChain>,
) -> StandingsOutcome {
    if teams.is_empty() {
        return StandingsOutcome {
            standings: Vec::new(),
            unresolved: Vec::new(),
        };
    }

    let match_refs: Vec<&Match> = matches.iter().collect();

    let mut standings: Vec<TeamStanding> = teams
        .iter()
        .map(|team| {
            let totals = team_totals(&team.id, &match_refs, points, walkover);
            TeamStanding {
                points: totals.points,
                played: totals.played,
                wins: totals.wins,
                draws: totals.draws,
                losses: totals.losses,
                goals_for: totals.goals_for,
                goals_against: totals.goals_against,
                goal_difference: totals.goal_difference,
                ..TeamStanding::empty(team.id.clone())
            }
        })
        .collect();

    let names: HashMap<TeamId, String> = teams
        .iter()
        .map(|t| (t.id.clone(), t.name.clone()))
        .collect();

    let default_chain;
    let active_chain = match chain {
        Some(c) => c,
        None => {
            default_chain = TieBreakChain::default_order();
            &default_chain
        }
    };

    let ctx = TieBreakContext {
        matches,
        points,
        walkover,
        names: &names,
    };
    let groups = rank_groups(&standings, active_chain, &ctx);

    // Competition ranking over the ordered groups, then flatten.
    let mut ordered = Vec::with_capacity(standings.len());
    let mut unresolved = Vec::new();
    let mut flat_index = 0usize;

    for group in groups {
        let position = (flat_index + 1) as u32;
        flat_index += group.len();

        if group.len() > 1
            && active_chain.ends_in_lottery()
            && group.iter().any(|&i| standings[i].played > 0)
        {
            unresolved.push(TieGroup {
                team_ids: group
                    .iter()
                    .map(|&i| standings[i].team_id.clone())
                    .collect(),
            });
        }

        for index in group {
            let mut standing = standings[index].clone();
            standing.position = if standing.played == 0 { 0 } else { position };
            ordered.push(standing);
        }
    }

    StandingsOutcome {
        standings: ordered,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SportRules;
    use crate::models::{EntityId, MatchSide, RawScore, TieBreakCriterion, TieBreakEntry};
    use pretty_assertions::assert_eq;

    fn team(id: &str, name: &str) -> Team {
        Team::with_id(EntityId::from(id), name, &name[..name.len().min(1)])
    }

    fn played(
        code: &str,
        home: (&str, &str),
        away: (&str, &str),
        home_score: i64,
        away_score: i64,
    ) -> Match {
        let winner = if home_score > away_score {
            Some(EntityId::from(home.0))
        } else if away_score > home_score {
            Some(EntityId::from(away.0))
        } else {
            None
        };

        Match::new(
            code,
            EntityId::from("block-a"),
            MatchSide::team(EntityId::from(home.0), home.1),
            MatchSide::team(EntityId::from(away.0), away.1),
        )
        .with_result(
            RawScore::Number(home_score),
            RawScore::Number(away_score),
            winner,
        )
        .confirmed()
    }

    fn lottery_chain(criteria: &[TieBreakCriterion]) -> TieBreakChain {
        let entries: Vec<TieBreakEntry> = criteria
            .iter()
            .enumerate()
            .map(|(i, &c)| TieBreakEntry::new(c, (i + 1) as u8))
            .collect();
        TieBreakChain::validate(&entries, &SportRules::for_code("football")).unwrap()
    }

    #[test]
    fn test_three_team_block_ranking() {
        // P-Q 2-1, P-R 1-1, Q-R 0-0 with 3/1/0 points:
        // P 1st (4 pts, +1), R 2nd (2 pts, 0), Q 3rd (1 pt, -1).
        let teams = vec![team("p", "P"), team("q", "Q"), team("r", "R")];
        let matches = vec![
            played("M1", ("p", "P"), ("q", "Q"), 2, 1),
            played("M2", ("p", "P"), ("r", "R"), 1, 1),
            played("M3", ("q", "Q"), ("r", "R"), 0, 0),
        ];

        let outcome = calculate(
            &teams,
            &matches,
            &PointValues::default(),
            &WalkoverGoals::default(),
            None,
        );

        let order: Vec<(&str, u32, u32, i64)> = outcome
            .standings
            .iter()
            .map(|s| (s.team_id.as_str(), s.position, s.points, s.goal_difference))
            .collect();

        assert_eq!(
            order,
            vec![("p", 1, 4, 1), ("r", 2, 2, 0), ("q", 3, 1, -1)]
        );
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn test_completeness_every_team_appears() {
        let teams = vec![team("a", "A"), team("b", "B"), team("c", "C"), team("d", "D")];
        let matches = vec![played("M1", ("a", "A"), ("b", "B"), 1, 0)];

        let outcome = calculate(
            &teams,
            &matches,
            &PointValues::default(),
            &WalkoverGoals::default(),
            None,
        );

        assert_eq!(outcome.standings.len(), teams.len());
    }

    #[test]
    fn test_zero_match_team_stays_unranked() {
        let teams = vec![team("a", "A"), team("b", "B"), team("c", "C")];
        let matches = vec![played("M1", ("a", "A"), ("b", "B"), 2, 0)];

        let outcome = calculate(
            &teams,
            &matches,
            &PointValues::default(),
            &WalkoverGoals::default(),
            None,
        );

        let c = outcome
            .standings
            .iter()
            .find(|s| s.team_id.as_str() == "c")
            .unwrap();
        assert_eq!(c.position, 0);
        assert_eq!(c.played, 0);
    }

    #[test]
    fn test_empty_team_set() {
        let outcome = calculate(
            &[],
            &[],
            &PointValues::default(),
            &WalkoverGoals::default(),
            None,
        );
        assert!(outcome.standings.is_empty());
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn test_idempotence() {
        let teams = vec![team("p", "P"), team("q", "Q"), team("r", "R")];
        let matches = vec![
            played("M1", ("p", "P"), ("q", "Q"), 2, 1),
            played("M2", ("p", "P"), ("r", "R"), 1, 1),
        ];

        let first = calculate(
            &teams,
            &matches,
            &PointValues::default(),
            &WalkoverGoals::default(),
            None,
        );
        let second = calculate(
            &teams,
            &matches,
            &PointValues::default(),
            &WalkoverGoals::default(),
            None,
        );

        assert_eq!(first.standings, second.standings);
    }

    #[test]
    fn test_walkover_uses_configured_goals() {
        let teams = vec![team("a", "A"), team("b", "B")];
        let m = Match::new(
            "M1",
            EntityId::from("block-a"),
            MatchSide::team(EntityId::from("a"), "A"),
            MatchSide::team(EntityId::from("b"), "B"),
        )
        .walkover_for(EntityId::from("a"))
        .confirmed();

        let walkover = WalkoverGoals { winner: 25, loser: 0 };
        let outcome = calculate(
            &[teams[0].clone(), teams[1].clone()],
            &[m],
            &PointValues::default(),
            &walkover,
            None,
        );

        let a = outcome
            .standings
            .iter()
            .find(|s| s.team_id.as_str() == "a")
            .unwrap();
        assert_eq!(a.goals_for, 25);
        assert_eq!(a.goals_against, 0);
        assert_eq!(a.wins, 1);

        let b = outcome
            .standings
            .iter()
            .find(|s| s.team_id.as_str() == "b")
            .unwrap();
        assert_eq!(b.goals_for, 0);
        assert_eq!(b.goals_against, 25);
        assert_eq!(b.losses, 1);
    }

    #[test]
    fn test_unconfirmed_matches_ignored() {
        let teams = vec![team("a", "A"), team("b", "B")];
        let mut m = played("M1", ("a", "A"), ("b", "B"), 3, 0);
        m.confirmed = false;

        let outcome = calculate(
            &teams,
            &[m],
            &PointValues::default(),
            &WalkoverGoals::default(),
            None,
        );

        assert!(outcome.standings.iter().all(|s| s.played == 0));
        assert!(outcome.standings.iter().all(|s| s.position == 0));
    }

    #[test]
    fn test_ties_convention_three_way_tie_then_fourth() {
        // a, b, c beat d once each and draw nothing else: all three level.
        // Chain = points then lottery, so the tie survives: positions
        // 1, 1, 1, then d in 4th.
        let teams = vec![team("a", "A"), team("b", "B"), team("c", "C"), team("d", "D")];
        let matches = vec![
            played("M1", ("a", "A"), ("d", "D"), 1, 0),
            played("M2", ("b", "B"), ("d", "D"), 1, 0),
            played("M3", ("c", "C"), ("d", "D"), 1, 0),
        ];

        let chain = lottery_chain(&[TieBreakCriterion::Points, TieBreakCriterion::Lottery]);
        let outcome = calculate(
            &teams,
            &matches,
            &PointValues::default(),
            &WalkoverGoals::default(),
            Some(&chain),
        );

        let positions: Vec<(&str, u32)> = outcome
            .standings
            .iter()
            .map(|s| (s.team_id.as_str(), s.position))
            .collect();

        assert_eq!(
            positions,
            vec![("a", 1), ("b", 1), ("c", 1), ("d", 4)]
        );

        assert_eq!(outcome.unresolved.len(), 1);
        assert_eq!(outcome.unresolved[0].team_ids.len(), 3);
    }

    #[test]
    fn test_exhausted_chain_raises_tie() {
        // Two teams level on points, goal difference, and goals for, with a
        // drawn head-to-head: both remain tied, and the tie is reported.
        let teams = vec![team("a", "Alpha"), team("b", "Beta"), team("c", "Gamma")];
        let matches = vec![
            played("M1", ("a", "Alpha"), ("b", "Beta"), 1, 1),
            played("M2", ("a", "Alpha"), ("c", "Gamma"), 2, 0),
            played("M3", ("b", "Beta"), ("c", "Gamma"), 2, 0),
        ];

        let chain = lottery_chain(&[
            TieBreakCriterion::Points,
            TieBreakCriterion::GoalDifference,
            TieBreakCriterion::GoalsFor,
            TieBreakCriterion::HeadToHead,
            TieBreakCriterion::Lottery,
        ]);

        let outcome = calculate(
            &teams,
            &matches,
            &PointValues::default(),
            &WalkoverGoals::default(),
            Some(&chain),
        );

        // Alpha and Beta share 1st, Gamma is 3rd.
        let positions: Vec<(&str, u32)> = outcome
            .standings
            .iter()
            .map(|s| (s.team_id.as_str(), s.position))
            .collect();
        assert_eq!(positions, vec![("a", 1), ("b", 1), ("c", 3)]);

        assert_eq!(outcome.unresolved.len(), 1);
        assert_eq!(
            outcome.unresolved[0].team_ids,
            vec![EntityId::from("a"), EntityId::from("b")]
        );
    }

    #[test]
    fn test_default_chain_tie_shares_position_without_report() {
        // Fully symmetric pair under the default chain: tied position, but
        // no operator action item since there is no lottery marker.
        let teams = vec![team("a", "Alpha"), team("b", "Beta")];
        let matches = vec![played("M1", ("a", "Alpha"), ("b", "Beta"), 1, 1)];

        let outcome = calculate(
            &teams,
            &matches,
            &PointValues::default(),
            &WalkoverGoals::default(),
            None,
        );

        assert_eq!(outcome.standings[0].position, 1);
        assert_eq!(outcome.standings[1].position, 1);
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn test_all_unplayed_tie_not_reported() {
        let teams = vec![team("a", "Alpha"), team("b", "Beta")];
        let chain = lottery_chain(&[TieBreakCriterion::Points, TieBreakCriterion::Lottery]);

        let outcome = calculate(
            &teams,
            &[],
            &PointValues::default(),
            &WalkoverGoals::default(),
            Some(&chain),
        );

        assert!(outcome.unresolved.is_empty());
        assert!(outcome.standings.iter().all(|s| s.position == 0));
    }

    #[test]
    fn test_text_scores_aggregate_per_period_totals() {
        let teams = vec![team("a", "A"), team("b", "B")];
        let m = Match::new(
            "M1",
            EntityId::from("block-a"),
            MatchSide::team(EntityId::from("a"), "A"),
            MatchSide::team(EntityId::from("b"), "B"),
        )
        .with_result(
            RawScore::Text("25-20".to_string()),
            RawScore::Text("23-25".to_string()),
            Some(EntityId::from("a")),
        )
        .confirmed();

        let outcome = calculate(
            &teams,
            &[m],
            &PointValues::default(),
            &WalkoverGoals::default(),
            None,
        );

        let a = outcome
            .standings
            .iter()
            .find(|s| s.team_id.as_str() == "a")
            .unwrap();
        assert_eq!(a.goals_for, 45);
        assert_eq!(a.goals_against, 48);
        assert_eq!(a.goal_difference, -3);
    }
}
