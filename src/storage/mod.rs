//! Store collaborator.
//!
//! The engine is agnostic to how tournament records are persisted; it only
//! needs read access to a block's teams, matches, templates and overrides,
//! and write access to replace ranking snapshots and rewrite match slots.
//! `MemoryStore` is the in-crate implementation; `jsonl` loads and saves
//! fixture directories.

mod jsonl;
mod memory;

pub use jsonl::{EntityKind, FixtureData, JsonlReader, JsonlWriter};
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{
    Block, BlockId, Match, MatchId, MatchTemplate, RankingSnapshot, Side, SlotOverride, Team,
    TeamId,
};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("snapshot for block {block_id} changed: expected version {expected}, found {actual}")]
    VersionConflict {
        block_id: BlockId,
        expected: u64,
        actual: u64,
    },
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Read/write access to tournament records.
#[async_trait]
pub trait Store: Send + Sync {
    /// A block by id.
    async fn block(&self, id: &BlockId) -> Result<Block, StoreError>;

    /// All blocks.
    async fn blocks(&self) -> Result<Vec<Block>, StoreError>;

    /// All teams.
    async fn teams(&self) -> Result<Vec<Team>, StoreError>;

    /// The teams belonging to one block.
    async fn block_teams(&self, block_id: &BlockId) -> Result<Vec<Team>, StoreError>;

    /// A match by id.
    async fn match_by_id(&self, id: &MatchId) -> Result<Match, StoreError>;

    /// The matches of one block.
    async fn block_matches(&self, block_id: &BlockId) -> Result<Vec<Match>, StoreError>;

    /// Every match in the tournament.
    async fn matches(&self) -> Result<Vec<Match>, StoreError>;

    /// All elimination templates.
    async fn templates(&self) -> Result<Vec<MatchTemplate>, StoreError>;

    /// All active overrides.
    async fn overrides(&self) -> Result<Vec<SlotOverride>, StoreError>;

    /// A block's current ranking snapshot.
    async fn snapshot(&self, block_id: &BlockId) -> Result<RankingSnapshot, StoreError>;

    /// All ranking snapshots.
    async fn snapshots(&self) -> Result<Vec<RankingSnapshot>, StoreError>;

    /// Replace a block's snapshot, compare-and-swap on its version.
    /// Succeeds only when the stored version equals `expected_version`;
    /// returns the new version.
    async fn replace_snapshot(
        &self,
        snapshot: RankingSnapshot,
        expected_version: u64,
    ) -> Result<u64, StoreError>;

    /// Rewrite one match side's team assignment.
    async fn update_match_slot(
        &self,
        match_code: &str,
        side: Side,
        team_id: &TeamId,
        display_name: &str,
    ) -> Result<(), StoreError>;
}
