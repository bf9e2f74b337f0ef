//! Manual slot overrides with audit metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Side, TeamId};

/// An operator-entered team assignment for one match side.
///
/// Supersedes the computed resolution for that exact match+side until
/// removed; re-applied on every resolution pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotOverride {
    /// Unique identifier
    pub id: Uuid,

    /// Match this override applies to
    pub match_code: String,

    /// Side this override applies to
    pub side: Side,

    /// Team the operator pinned into the slot
    pub team_id: TeamId,

    /// Why the override was entered
    pub reason: String,

    /// Who entered it
    pub created_by: String,

    /// When it was entered
    pub created_at: DateTime<Utc>,
}

impl SlotOverride {
    /// Create a new override.
    pub fn new(
        match_code: impl Into<String>,
        side: Side,
        team_id: TeamId,
        reason: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_code: match_code.into(),
            side,
            team_id,
            reason: reason.into(),
            created_by: created_by.into(),
            created_at: Utc::now(),
        }
    }

    /// Whether this override targets the given slot.
    pub fn targets(&self, match_code: &str, side: Side) -> bool {
        self.match_code == match_code && self.side == side
    }
}
