//! Promotion validation and safe auto-correction.
//!
//! Compares each bracket slot's actual team against the resolved
//! expectation. Mismatches on unconfirmed matches are safe to fix; a
//! confirmed match already carries a played result, so its assignment is
//! never altered — only reported.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Match, Side, TeamId};

use super::resolver::ResolvedSlot;

/// How bad a slot mismatch is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Unconfirmed match — eligible for auto-fix
    Warning,
    /// Confirmed match — must never be silently altered
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A slot whose actual team differs from the resolved expectation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionIssue {
    pub match_code: String,
    pub side: Side,

    pub expected_team_id: TeamId,
    pub expected_team_name: String,

    /// Team currently in the slot; `None` while the slot still shows the
    /// template placeholder
    pub current_team_id: Option<TeamId>,
    pub current_display: String,

    /// True when the slot shows the original placeholder label (expected
    /// mid-tournament) rather than a different real team (a genuine
    /// misassignment)
    pub placeholder: bool,

    pub severity: Severity,
}

impl PromotionIssue {
    /// Operator-facing description. Placeholder slots and misassigned
    /// slots read differently.
    pub fn message(&self) -> String {
        if self.placeholder {
            format!(
                "{} {}: slot still shows placeholder \"{}\", expected {}",
                self.match_code, self.side, self.current_display, self.expected_team_name
            )
        } else {
            format!(
                "{} {}: slot shows {} but standings resolve to {}",
                self.match_code, self.side, self.current_display, self.expected_team_name
            )
        }
    }
}

/// A planned slot correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFix {
    pub match_code: String,
    pub side: Side,
    pub team_id: TeamId,
    pub team_name: String,
}

/// Outcome of applying planned fixes.
#[derive(Debug, Clone, Default)]
pub struct FixReport {
    /// Fixes applied
    pub fixed: Vec<SlotFix>,

    /// Fixes that could not be applied, with the failure reason
    pub failed: Vec<(SlotFix, String)>,

    /// Error-severity issues left untouched
    pub skipped: usize,
}

impl FixReport {
    pub fn total_attempted(&self) -> usize {
        self.fixed.len() + self.failed.len()
    }
}

/// Compare resolved expectations against the actual match assignments.
///
/// Slots whose expectation is still unresolved produce no issue — an empty
/// placeholder waiting on standings is the normal mid-tournament state.
pub fn validate(resolved: &[ResolvedSlot], matches: &[Match]) -> Vec<PromotionIssue> {
    let mut issues = Vec::new();

    for slot in resolved {
        let Some(expected) = &slot.expected else {
            continue;
        };

        let Some(m) = matches.iter().find(|m| m.code == slot.match_code) else {
            debug!(code = %slot.match_code, "template references a missing match");
            continue;
        };

        let side = m.side(slot.side);
        if side.team_id.as_ref() == Some(&expected.team_id) {
            continue;
        }

        let severity = if m.confirmed {
            Severity::Error
        } else {
            Severity::Warning
        };

        issues.push(PromotionIssue {
            match_code: slot.match_code.clone(),
            side: slot.side,
            expected_team_id: expected.team_id.clone(),
            expected_team_name: expected.name.clone(),
            current_team_id: side.team_id.clone(),
            current_display: side.display_name.clone(),
            placeholder: side.is_placeholder(),
            severity,
        });
    }

    issues
}

/// Plan fixes for the safe issues. Error-severity issues are excluded by
/// construction — the count of exclusions lands in the eventual report.
pub fn plan_fixes(issues: &[PromotionIssue]) -> (Vec<SlotFix>, usize) {
    let fixes = issues
        .iter()
        .filter(|i| i.severity == Severity::Warning)
        .map(|i| SlotFix {
            match_code: i.match_code.clone(),
            side: i.side,
            team_id: i.expected_team_id.clone(),
            team_name: i.expected_team_name.clone(),
        })
        .collect();

    let skipped = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();

    (fixes, skipped)
}
