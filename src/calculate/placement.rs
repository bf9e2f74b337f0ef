//! Final placement assignment.
//!
//! When an elimination match with placement metadata is confirmed, the
//! winner and loser get their final positions written into the owning
//! block's ranking snapshot. The snapshot is updated as one unit; a
//! position an operator set by hand is never overwritten.

use tracing::debug;

use crate::models::{Match, MatchTemplate, RankingSnapshot, TeamId, TeamStanding};

/// Compute the standings update for a confirmed placement match.
///
/// Returns the full replacement standings list, or `None` when there is
/// nothing to write (no placement metadata, match not decided, or every
/// assignment skipped).
pub fn assign(
    template: &MatchTemplate,
    m: &Match,
    snapshot: &RankingSnapshot,
) -> Option<Vec<TeamStanding>> {
    if !template.has_placements() || !m.has_confirmed_result() {
        return None;
    }

    let mut standings = snapshot.standings.clone();
    let mut changed = false;

    if let (Some(position), Some(winner_id)) = (template.winner_position, m.winner_id.as_ref()) {
        changed |= set_position(&mut standings, winner_id, position, &m.code);
    }

    // Losers of a shared range all take the start value; the range end only
    // documents how far the shared placement stretches.
    if let (Some(position), Some(loser_id)) = (template.loser_position_start, m.loser_id()) {
        changed |= set_position(&mut standings, loser_id, position, &m.code);
    }

    changed.then_some(standings)
}

fn set_position(
    standings: &mut [TeamStanding],
    team_id: &TeamId,
    position: u32,
    match_code: &str,
) -> bool {
    let Some(standing) = standings.iter_mut().find(|s| &s.team_id == team_id) else {
        debug!(team = %team_id, code = match_code, "placement target not in snapshot");
        return false;
    };

    if standing.manual_position && standing.position > 0 {
        debug!(
            team = %team_id,
            code = match_code,
            "skipping automatic placement over a manual position"
        );
        return false;
    }

    if standing.position == position {
        return false;
    }

    standing.position = position;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityId, MatchSide, RawScore};

    fn final_template() -> MatchTemplate {
        MatchTemplate::new("M12", "W_M10".parse().unwrap(), "W_M11".parse().unwrap())
            .with_placements(Some(1), Some(2), None)
    }

    fn decided_final(winner: &str, loser: &str) -> Match {
        Match::new(
            "M12",
            EntityId::from("block-ko"),
            MatchSide::team(EntityId::from(winner), "Winner"),
            MatchSide::team(EntityId::from(loser), "Loser"),
        )
        .with_result(
            RawScore::Number(2),
            RawScore::Number(1),
            Some(EntityId::from(winner)),
        )
        .confirmed()
    }

    fn snapshot(teams: &[&str]) -> RankingSnapshot {
        RankingSnapshot {
            standings: teams
                .iter()
                .map(|t| TeamStanding::empty(EntityId::from(*t)))
                .collect(),
            ..RankingSnapshot::empty(EntityId::from("block-ko"))
        }
    }

    fn position_of(standings: &[TeamStanding], team: &str) -> u32 {
        standings
            .iter()
            .find(|s| s.team_id.as_str() == team)
            .unwrap()
            .position
    }

    #[test]
    fn test_assign_winner_and_loser() {
        let updated = assign(
            &final_template(),
            &decided_final("t-1", "t-2"),
            &snapshot(&["t-1", "t-2", "t-3"]),
        )
        .unwrap();

        assert_eq!(position_of(&updated, "t-1"), 1);
        assert_eq!(position_of(&updated, "t-2"), 2);
        assert_eq!(position_of(&updated, "t-3"), 0);
    }

    #[test]
    fn test_shared_loser_range_uses_start() {
        // Semifinal losers share 3rd place: both templates carry 3..4 and
        // both losers end up at 3.
        let template = MatchTemplate::new("M10", "A_1".parse().unwrap(), "B_2".parse().unwrap())
            .with_placements(None, Some(3), Some(4));

        let semifinal = Match::new(
            "M10",
            EntityId::from("block-ko"),
            MatchSide::team(EntityId::from("t-1"), "A1"),
            MatchSide::team(EntityId::from("t-4"), "B2"),
        )
        .with_result(
            RawScore::Number(1),
            RawScore::Number(0),
            Some(EntityId::from("t-1")),
        )
        .confirmed();

        let updated = assign(&template, &semifinal, &snapshot(&["t-1", "t-4"])).unwrap();

        assert_eq!(position_of(&updated, "t-4"), 3);
        // No winner_position on a semifinal: the winner advances instead.
        assert_eq!(position_of(&updated, "t-1"), 0);
    }

    #[test]
    fn test_manual_position_never_overwritten() {
        let mut snap = snapshot(&["t-1", "t-2"]);
        snap.standings[1].position = 5;
        snap.standings[1].manual_position = true;

        let updated = assign(&final_template(), &decided_final("t-1", "t-2"), &snap).unwrap();

        assert_eq!(position_of(&updated, "t-1"), 1);
        // Loser keeps the operator-set 5, not the template's 2.
        assert_eq!(position_of(&updated, "t-2"), 5);
    }

    #[test]
    fn test_unconfirmed_match_assigns_nothing() {
        let mut m = decided_final("t-1", "t-2");
        m.confirmed = false;

        assert!(assign(&final_template(), &m, &snapshot(&["t-1", "t-2"])).is_none());
    }

    #[test]
    fn test_template_without_placements_assigns_nothing() {
        let template = MatchTemplate::new("M12", "W_M10".parse().unwrap(), "W_M11".parse().unwrap());

        assert!(assign(&template, &decided_final("t-1", "t-2"), &snapshot(&["t-1", "t-2"])).is_none());
    }

    #[test]
    fn test_idempotent_reapply_reports_no_change() {
        let snap = snapshot(&["t-1", "t-2"]);
        let m = decided_final("t-1", "t-2");
        let template = final_template();

        let updated = assign(&template, &m, &snap).unwrap();

        let reapplied_snapshot = RankingSnapshot {
            standings: updated,
            ..snap
        };
        assert!(assign(&template, &m, &reapplied_snapshot).is_none());
    }

    #[test]
    fn test_walkover_final_still_places() {
        let m = Match::new(
            "M12",
            EntityId::from("block-ko"),
            MatchSide::team(EntityId::from("t-1"), "Winner"),
            MatchSide::team(EntityId::from("t-2"), "Loser"),
        )
        .walkover_for(EntityId::from("t-1"))
        .confirmed();

        let updated = assign(&final_template(), &m, &snapshot(&["t-1", "t-2"])).unwrap();
        assert_eq!(position_of(&updated, "t-1"), 1);
        assert_eq!(position_of(&updated, "t-2"), 2);
    }
}
