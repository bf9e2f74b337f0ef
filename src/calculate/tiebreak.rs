//! Tie-break rule engine.
//!
//! Validates a configured criterion chain and applies it to split teams
//! with equal aggregate stats into ranked groups. A group that survives the
//! whole chain stays a group: the engine never invents an order to force a
//! strict ranking — that is what the lottery marker hands to an operator.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::{PointValues, SportRules, WalkoverGoals};
use crate::models::{Match, TeamId, TeamStanding, TieBreakCriterion, TieBreakEntry};

use super::standings::team_totals;

/// Minimum number of chain entries.
pub const MIN_CHAIN_ENTRIES: usize = 1;
/// Maximum number of chain entries.
pub const MAX_CHAIN_ENTRIES: usize = 5;

/// A single validation failure in a configured chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainViolation {
    #[error("chain must have between {MIN_CHAIN_ENTRIES} and {MAX_CHAIN_ENTRIES} entries, got {0}")]
    EntryCount(usize),

    #[error("duplicate criterion: {0}")]
    DuplicateCriterion(TieBreakCriterion),

    #[error("orders must form a contiguous 1..={expected} sequence, got {found:?}")]
    BrokenOrderSequence { expected: usize, found: Vec<u8> },

    #[error("criterion {criterion} is not allowed for sport {sport}")]
    CriterionNotAllowed {
        criterion: TieBreakCriterion,
        sport: String,
    },
}

/// A rejected chain, listing every violation found.
#[derive(Debug, Clone, Error)]
pub struct ChainValidationError {
    pub violations: Vec<ChainViolation>,
}

impl std::fmt::Display for ChainValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid tie-break chain: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

/// A validated, ordered tie-break chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TieBreakChain {
    criteria: Vec<TieBreakCriterion>,
}

impl TieBreakChain {
    /// Validate configured entries against the sport's allowed set.
    /// Collects every violation instead of failing on the first.
    pub fn validate(
        entries: &[TieBreakEntry],
        sport: &SportRules,
    ) -> Result<Self, ChainValidationError> {
        let mut violations = Vec::new();

        if entries.len() < MIN_CHAIN_ENTRIES || entries.len() > MAX_CHAIN_ENTRIES {
            violations.push(ChainViolation::EntryCount(entries.len()));
        }

        let mut seen = HashSet::new();
        for entry in entries {
            if !seen.insert(entry.criterion) {
                violations.push(ChainViolation::DuplicateCriterion(entry.criterion));
            }
            if !sport.allows(entry.criterion) {
                violations.push(ChainViolation::CriterionNotAllowed {
                    criterion: entry.criterion,
                    sport: sport.code.clone(),
                });
            }
        }

        let mut orders: Vec<u8> = entries.iter().map(|e| e.order).collect();
        orders.sort_unstable();
        let contiguous = orders
            .iter()
            .enumerate()
            .all(|(i, &order)| order as usize == i + 1);
        if !entries.is_empty() && !contiguous {
            violations.push(ChainViolation::BrokenOrderSequence {
                expected: entries.len(),
                found: orders,
            });
        }

        if !violations.is_empty() {
            return Err(ChainValidationError { violations });
        }

        let mut sorted = entries.to_vec();
        sorted.sort_by_key(|e| e.order);
        Ok(Self {
            criteria: sorted.into_iter().map(|e| e.criterion).collect(),
        })
    }

    /// The built-in default order used when no chain is configured:
    /// points, goal difference, goals for. Never lottery.
    pub fn default_order() -> Self {
        Self {
            criteria: vec![
                TieBreakCriterion::Points,
                TieBreakCriterion::GoalDifference,
                TieBreakCriterion::GoalsFor,
            ],
        }
    }

    /// The criteria in application order.
    pub fn criteria(&self) -> &[TieBreakCriterion] {
        &self.criteria
    }

    /// Whether the chain ends at the lottery marker. Only such chains hand
    /// surviving ties to an operator.
    pub fn ends_in_lottery(&self) -> bool {
        self.criteria.last() == Some(&TieBreakCriterion::Lottery)
    }
}

/// Inputs the chain needs beyond the aggregate standings: the match set
/// (for head-to-head recomputation) and the scoring configuration.
pub struct TieBreakContext<'a> {
    pub matches: &'a [Match],
    pub points: &'a PointValues,
    pub walkover: &'a WalkoverGoals,
    /// Team display names, for the stable name-ascending fallback order
    pub names: &'a HashMap<TeamId, String>,
}

impl TieBreakContext<'_> {
    fn name_of(&self, team_id: &TeamId) -> &str {
        self.names.get(team_id).map(String::as_str).unwrap_or("")
    }
}

/// Apply the chain to the given standings. Returns ranked groups of indices
/// into `standings`: each group holds teams still equal after the whole
/// chain (usually a single team). Within a group the order is team name
/// ascending — a stable display order, not a claimed rank.
pub fn rank_groups(
    standings: &[TeamStanding],
    chain: &TieBreakChain,
    ctx: &TieBreakContext<'_>,
) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = vec![(0..standings.len()).collect()];

    for &criterion in chain.criteria() {
        let mut refined = Vec::with_capacity(groups.len());
        for group in groups {
            if group.len() <= 1 || criterion == TieBreakCriterion::Lottery {
                refined.push(group);
                continue;
            }
            refined.extend(split_group(standings, group, criterion, ctx));
        }
        groups = refined;
    }

    for group in &mut groups {
        group.sort_by(|&a, &b| {
            ctx.name_of(&standings[a].team_id)
                .cmp(ctx.name_of(&standings[b].team_id))
        });
    }

    groups
}

/// Split one tied group on a single criterion, preserving rank order.
fn split_group(
    standings: &[TeamStanding],
    group: Vec<usize>,
    criterion: TieBreakCriterion,
    ctx: &TieBreakContext<'_>,
) -> Vec<Vec<usize>> {
    let keys: HashMap<usize, (i64, i64, i64)> = match criterion {
        TieBreakCriterion::Points => simple_keys(&group, |s: &TeamStanding| s.points as i64, standings),
        TieBreakCriterion::GoalDifference => simple_keys(&group, |s| s.goal_difference, standings),
        TieBreakCriterion::GoalsFor => simple_keys(&group, |s| s.goals_for as i64, standings),
        TieBreakCriterion::Wins => simple_keys(&group, |s| s.wins as i64, standings),
        TieBreakCriterion::HeadToHead => head_to_head_keys(&group, standings, ctx),
        TieBreakCriterion::Lottery => return vec![group],
    };

    let mut sorted = group;
    sorted.sort_by_key(|i| Reverse(keys[i]));

    let mut result: Vec<Vec<usize>> = Vec::new();
    for index in sorted {
        match result.last_mut() {
            Some(current) if keys[current.last().unwrap()] == keys[&index] => current.push(index),
            _ => result.push(vec![index]),
        }
    }
    result
}

fn simple_keys(
    group: &[usize],
    key: impl Fn(&TeamStanding) -> i64,
    standings: &[TeamStanding],
) -> HashMap<usize, (i64, i64, i64)> {
    group
        .iter()
        .map(|&i| (i, (key(&standings[i]), 0, 0)))
        .collect()
}

/// Head-to-head keys: points, goal difference, goals for — recomputed over
/// only the matches played among the tied subset.
fn head_to_head_keys(
    group: &[usize],
    standings: &[TeamStanding],
    ctx: &TieBreakContext<'_>,
) -> HashMap<usize, (i64, i64, i64)> {
    let subset: HashSet<&TeamId> = group.iter().map(|&i| &standings[i].team_id).collect();

    let mutual: Vec<&Match> = ctx
        .matches
        .iter()
        .filter(|m| m.has_confirmed_result())
        .filter(|m| {
            match (&m.home.team_id, &m.away.team_id) {
                (Some(home), Some(away)) => subset.contains(home) && subset.contains(away),
                _ => false,
            }
        })
        .collect();

    group
        .iter()
        .map(|&i| {
            let totals = team_totals(&standings[i].team_id, &mutual, ctx.points, ctx.walkover);
            (
                i,
                (
                    totals.points as i64,
                    totals.goal_difference,
                    totals.goals_for as i64,
                ),
            )
        })
        .collect()
}
