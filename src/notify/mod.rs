//! Structured engine events for operator-facing systems.
//!
//! The engine only emits; delivery (email, dashboards, chat) belongs to an
//! external collaborator behind the `EventSink` trait.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculate::Severity;
use crate::models::{BlockId, Side, TeamId};

/// An event the engine wants an operator to see.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A tie-break chain ran out with teams still level
    TieUnresolved {
        block_id: BlockId,
        team_ids: Vec<TeamId>,
        /// The chain that was exhausted, as display labels
        chain: Vec<String>,
    },

    /// A bracket slot disagrees with the resolved expectation
    PromotionMismatch {
        match_code: String,
        side: Side,
        severity: Severity,
        expected_team: String,
        actual_team: String,
    },
}

/// Sink for engine events.
pub trait EventSink: Send + Sync {
    /// Sink name for logging.
    fn name(&self) -> &'static str;

    /// Accept one event.
    fn emit(&self, event: EngineEvent);
}

/// Sink that logs events through `tracing`. The default wiring for the CLI.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn emit(&self, event: EngineEvent) {
        match &event {
            EngineEvent::TieUnresolved {
                block_id, team_ids, ..
            } => {
                warn!(
                    block = %block_id,
                    teams = team_ids.len(),
                    "tie requires manual resolution"
                );
            }
            EngineEvent::PromotionMismatch {
                match_code,
                side,
                severity,
                expected_team,
                actual_team,
            } => {
                info!(
                    code = %match_code,
                    side = %side,
                    severity = %severity,
                    expected = %expected_team,
                    actual = %actual_team,
                    "promotion issue"
                );
            }
        }
    }
}

/// Sink that collects events in memory; used by tests and dry runs.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything emitted so far.
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Drain and return everything emitted so far.
    pub fn take(&self) -> Vec<EngineEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl EventSink for CollectingSink {
    fn name(&self) -> &'static str {
        "collecting"
    }

    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
