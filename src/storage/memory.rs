//! In-memory store.
//!
//! Backs the CLI and tests. A single `RwLock` guards all tables; snapshot
//! replacement is a compare-and-swap on the snapshot version, so two
//! near-simultaneous recomputes of the same block surface as a
//! `VersionConflict` instead of a silent lost update.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{
    Block, BlockId, Match, MatchId, MatchTemplate, RankingSnapshot, Side, SlotOverride, Team,
    TeamId,
};

use super::{Store, StoreError};

#[derive(Debug, Default)]
struct Tables {
    blocks: HashMap<BlockId, Block>,
    teams: HashMap<TeamId, Team>,
    matches: HashMap<MatchId, Match>,
    templates: Vec<MatchTemplate>,
    overrides: Vec<SlotOverride>,
    snapshots: HashMap<BlockId, RankingSnapshot>,
}

/// In-memory implementation of [`Store`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a team.
    pub async fn insert_team(&self, team: Team) {
        self.tables.write().await.teams.insert(team.id.clone(), team);
    }

    /// Insert a block, seeding its empty ranking snapshot.
    pub async fn insert_block(&self, block: Block) {
        let mut tables = self.tables.write().await;
        tables
            .snapshots
            .entry(block.id.clone())
            .or_insert_with(|| RankingSnapshot::empty(block.id.clone()));
        tables.blocks.insert(block.id.clone(), block);
    }

    /// Insert a match.
    pub async fn insert_match(&self, m: Match) {
        self.tables.write().await.matches.insert(m.id.clone(), m);
    }

    /// Insert a template.
    pub async fn insert_template(&self, template: MatchTemplate) {
        self.tables.write().await.templates.push(template);
    }

    /// Add an override.
    pub async fn insert_override(&self, slot_override: SlotOverride) {
        self.tables.write().await.overrides.push(slot_override);
    }

    /// Remove an override by id. Returns whether it existed.
    pub async fn remove_override(&self, id: &uuid::Uuid) -> bool {
        let mut tables = self.tables.write().await;
        let before = tables.overrides.len();
        tables.overrides.retain(|o| &o.id != id);
        tables.overrides.len() != before
    }

    /// Overwrite a stored match (test/fixture helper).
    pub async fn put_match(&self, m: Match) {
        self.insert_match(m).await;
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn block(&self, id: &BlockId) -> Result<Block, StoreError> {
        self.tables
            .read()
            .await
            .blocks
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("block", id))
    }

    async fn blocks(&self) -> Result<Vec<Block>, StoreError> {
        Ok(self.tables.read().await.blocks.values().cloned().collect())
    }

    async fn teams(&self) -> Result<Vec<Team>, StoreError> {
        Ok(self.tables.read().await.teams.values().cloned().collect())
    }

    async fn block_teams(&self, block_id: &BlockId) -> Result<Vec<Team>, StoreError> {
        let tables = self.tables.read().await;
        let block = tables
            .blocks
            .get(block_id)
            .ok_or_else(|| StoreError::not_found("block", block_id))?;

        block
            .team_ids
            .iter()
            .map(|team_id| {
                tables
                    .teams
                    .get(team_id)
                    .cloned()
                    .ok_or_else(|| StoreError::not_found("team", team_id))
            })
            .collect()
    }

    async fn match_by_id(&self, id: &MatchId) -> Result<Match, StoreError> {
        self.tables
            .read()
            .await
            .matches
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("match", id))
    }

    async fn block_matches(&self, block_id: &BlockId) -> Result<Vec<Match>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .matches
            .values()
            .filter(|m| &m.block_id == block_id)
            .cloned()
            .collect())
    }

    async fn matches(&self) -> Result<Vec<Match>, StoreError> {
        Ok(self.tables.read().await.matches.values().cloned().collect())
    }

    async fn templates(&self) -> Result<Vec<MatchTemplate>, StoreError> {
        Ok(self.tables.read().await.templates.clone())
    }

    async fn overrides(&self) -> Result<Vec<SlotOverride>, StoreError> {
        Ok(self.tables.read().await.overrides.clone())
    }

    async fn snapshot(&self, block_id: &BlockId) -> Result<RankingSnapshot, StoreError> {
        self.tables
            .read()
            .await
            .snapshots
            .get(block_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("snapshot", block_id))
    }

    async fn snapshots(&self) -> Result<Vec<RankingSnapshot>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .snapshots
            .values()
            .cloned()
            .collect())
    }

    async fn replace_snapshot(
        &self,
        mut snapshot: RankingSnapshot,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let current = tables
            .snapshots
            .get(&snapshot.block_id)
            .ok_or_else(|| StoreError::not_found("snapshot", &snapshot.block_id))?;

        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                block_id: snapshot.block_id.clone(),
                expected: expected_version,
                actual: current.version,
            });
        }

        snapshot.version = expected_version + 1;
        snapshot.computed_at = Utc::now();
        let new_version = snapshot.version;
        debug!(block = %snapshot.block_id, version = new_version, "snapshot replaced");
        tables.snapshots.insert(snapshot.block_id.clone(), snapshot);
        Ok(new_version)
    }

    async fn update_match_slot(
        &self,
        match_code: &str,
        side: Side,
        team_id: &TeamId,
        display_name: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let m = tables
            .matches
            .values_mut()
            .find(|m| m.code == match_code)
            .ok_or_else(|| StoreError::not_found("match", match_code))?;

        let slot = m.side_mut(side);
        slot.team_id = Some(team_id.clone());
        slot.display_name = display_name.to_string();
        Ok(())
    }
}
