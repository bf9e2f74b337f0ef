//! JSONL fixture files.
//!
//! One entity per line. A fixture directory holds the whole tournament
//! state the engine needs: teams, blocks, matches, templates, overrides,
//! and the current ranking snapshots.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::models::{Block, Match, MatchTemplate, RankingSnapshot, SlotOverride, Team};

use super::{MemoryStore, Store, StoreError};

/// Entity kinds stored in a fixture directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Team,
    Block,
    Match,
    Template,
    Override,
    Snapshot,
}

impl EntityKind {
    /// Get the filename for this entity kind.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityKind::Team => "teams.jsonl",
            EntityKind::Block => "blocks.jsonl",
            EntityKind::Match => "matches.jsonl",
            EntityKind::Template => "templates.jsonl",
            EntityKind::Override => "overrides.jsonl",
            EntityKind::Snapshot => "snapshots.jsonl",
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a writer for an entity kind inside a fixture directory.
    pub fn for_kind(dir: &Path, kind: EntityKind) -> Self {
        Self::new(dir.join(kind.filename()))
    }

    fn ensure_dir(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write entities, replacing the entire file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StoreError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        debug!("Wrote {} entities to {:?}", count, self.path);

        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Create a reader for an entity kind inside a fixture directory.
    pub fn for_kind(dir: &Path, kind: EntityKind) -> Self {
        Self::new(dir.join(kind.filename()))
    }

    /// Read all entities from the file. A missing file reads as empty;
    /// unparseable lines are logged and skipped.
    pub fn read_all(&self) -> Result<Vec<T>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();
        let mut line_num = 0;

        for line in reader.lines() {
            line_num += 1;
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!(
                        "Failed to parse line {} in {:?}: {}",
                        line_num, self.path, e
                    );
                }
            }
        }

        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

/// A whole tournament fixture, as loaded from a directory.
#[derive(Debug, Default)]
pub struct FixtureData {
    pub teams: Vec<Team>,
    pub blocks: Vec<Block>,
    pub matches: Vec<Match>,
    pub templates: Vec<MatchTemplate>,
    pub overrides: Vec<SlotOverride>,
    pub snapshots: Vec<RankingSnapshot>,
}

impl FixtureData {
    /// Load a fixture directory.
    pub fn load(dir: &Path) -> Result<Self, StoreError> {
        if !dir.exists() {
            return Err(StoreError::PathNotFound(dir.to_path_buf()));
        }

        Ok(Self {
            teams: JsonlReader::for_kind(dir, EntityKind::Team).read_all()?,
            blocks: JsonlReader::for_kind(dir, EntityKind::Block).read_all()?,
            matches: JsonlReader::for_kind(dir, EntityKind::Match).read_all()?,
            templates: JsonlReader::for_kind(dir, EntityKind::Template).read_all()?,
            overrides: JsonlReader::for_kind(dir, EntityKind::Override).read_all()?,
            snapshots: JsonlReader::for_kind(dir, EntityKind::Snapshot).read_all()?,
        })
    }

    /// Save everything back to a fixture directory.
    pub fn save(&self, dir: &Path) -> Result<(), StoreError> {
        JsonlWriter::for_kind(dir, EntityKind::Team).write_all(&self.teams)?;
        JsonlWriter::for_kind(dir, EntityKind::Block).write_all(&self.blocks)?;
        JsonlWriter::for_kind(dir, EntityKind::Match).write_all(&self.matches)?;
        JsonlWriter::for_kind(dir, EntityKind::Template).write_all(&self.templates)?;
        JsonlWriter::for_kind(dir, EntityKind::Override).write_all(&self.overrides)?;
        JsonlWriter::for_kind(dir, EntityKind::Snapshot).write_all(&self.snapshots)?;
        Ok(())
    }

    /// Build a populated in-memory store. Blocks without a stored snapshot
    /// get an empty one.
    pub async fn into_store(self) -> MemoryStore {
        let store = MemoryStore::new();

        for team in self.teams {
            store.insert_team(team).await;
        }
        for block in self.blocks {
            store.insert_block(block).await;
        }
        for snapshot in self.snapshots {
            let expected = store
                .snapshot(&snapshot.block_id)
                .await
                .map(|s| s.version)
                .unwrap_or(0);
            // Fixture snapshots seed the store as-is; a failure here means
            // the fixture references a block that does not exist.
            if let Err(e) = store.replace_snapshot(snapshot, expected).await {
                warn!("Skipping fixture snapshot: {}", e);
            }
        }
        for m in self.matches {
            store.insert_match(m).await;
        }
        for template in self.templates {
            store.insert_template(template).await;
        }
        for slot_override in self.overrides {
            store.insert_override(slot_override).await;
        }

        store
    }
}
