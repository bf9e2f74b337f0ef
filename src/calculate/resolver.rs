//! Bracket template resolution.
//!
//! Maps symbolic slot sources to concrete teams using the latest ranking
//! snapshots, prior match results, and manual overrides. Pure: resolution
//! is recomputed on demand from explicit inputs, never cached — staleness
//! self-heals on the next pass.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{
    Block, Match, MatchTemplate, RankingSnapshot, Side, SlotOverride, SlotSource, Team, TeamId,
};

/// The concrete team a slot should currently hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedTeam {
    pub team_id: TeamId,
    pub name: String,
}

/// One resolved template side.
#[derive(Debug, Clone)]
pub struct ResolvedSlot {
    pub match_code: String,
    pub side: Side,
    pub source: SlotSource,

    /// `None` while the source cannot be resolved yet (standings not final,
    /// feeder match unplayed, or a tie making the position ambiguous)
    pub expected: Option<ExpectedTeam>,

    /// Whether a manual override supplied the expectation
    pub via_override: bool,
}

/// Everything resolution reads from. All references — the resolver owns
/// nothing and mutates nothing.
pub struct ResolveContext<'a> {
    pub blocks: &'a [Block],
    pub snapshots: &'a [RankingSnapshot],
    pub teams: &'a [Team],
    pub matches: &'a [Match],
    pub overrides: &'a [SlotOverride],
}

impl<'a> ResolveContext<'a> {
    fn block_by_code(&self, code: &str) -> Option<&'a Block> {
        self.blocks.iter().find(|b| b.code == code)
    }

    fn snapshot_of(&self, block: &Block) -> Option<&'a RankingSnapshot> {
        self.snapshots.iter().find(|s| s.block_id == block.id)
    }

    fn team(&self, team_id: &TeamId) -> Option<&'a Team> {
        self.teams.iter().find(|t| &t.id == team_id)
    }

    fn match_by_code(&self, code: &str) -> Option<&'a Match> {
        self.matches.iter().find(|m| m.code == code)
    }
}

/// Resolve every symbolic side of the given templates.
///
/// Fixed sides resolve to themselves and produce no promotion work, so they
/// are omitted — unless an override targets them, which always wins.
pub fn resolve_templates(
    templates: &[MatchTemplate],
    ctx: &ResolveContext<'_>,
) -> Vec<ResolvedSlot> {
    let overrides: HashMap<(&str, Side), &SlotOverride> = ctx
        .overrides
        .iter()
        .map(|o| ((o.match_code.as_str(), o.side), o))
        .collect();

    let mut resolved = Vec::new();
    for template in templates {
        for (side, source) in [
            (Side::Home, &template.home_source),
            (Side::Away, &template.away_source),
        ] {
            let slot_override = overrides.get(&(template.match_code.as_str(), side));

            if !source.is_symbolic() && slot_override.is_none() {
                continue;
            }

            let (expected, via_override) = match slot_override {
                Some(o) => (expected_from_id(&o.team_id, ctx), true),
                None => (resolve_source(source, ctx), false),
            };

            resolved.push(ResolvedSlot {
                match_code: template.match_code.clone(),
                side,
                source: source.clone(),
                expected,
                via_override,
            });
        }
    }
    resolved
}

fn expected_from_id(team_id: &TeamId, ctx: &ResolveContext<'_>) -> Option<ExpectedTeam> {
    let team = ctx.team(team_id)?;
    Some(ExpectedTeam {
        team_id: team.id.clone(),
        name: team.name.clone(),
    })
}

/// Resolve a single source to the team currently at its reference.
fn resolve_source(source: &SlotSource, ctx: &ResolveContext<'_>) -> Option<ExpectedTeam> {
    match source {
        SlotSource::Fixed { team_id } => expected_from_id(team_id, ctx),

        SlotSource::BlockPosition {
            block_code,
            position,
        } => {
            let block = ctx.block_by_code(block_code)?;
            let snapshot = ctx.snapshot_of(block)?;
            let standing = snapshot.unique_team_at(*position)?;
            expected_from_id(&standing.team_id, ctx)
        }

        SlotSource::WinnerOf { match_code } => {
            let feeder = decided_match(match_code, ctx)?;
            expected_from_id(feeder.winner_id.as_ref()?, ctx)
        }

        SlotSource::LoserOf { match_code } => {
            let feeder = decided_match(match_code, ctx)?;
            expected_from_id(feeder.loser_id()?, ctx)
        }
    }
}

fn decided_match<'a>(match_code: &str, ctx: &ResolveContext<'a>) -> Option<&'a Match> {
    let feeder = ctx.match_by_code(match_code)?;
    if feeder.has_confirmed_result() {
        Some(feeder)
    } else {
        debug!(code = match_code, "feeder match not decided yet");
        None
    }
}
