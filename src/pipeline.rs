//! Orchestration: wires the pure computation core to the store and the
//! event sink.
//!
//! Every flow is a full, idempotent recomputation over the store's current
//! records — no deltas, no cached resolutions — so transient staleness
//! self-heals on the next trigger. Snapshot writes are compare-and-swap on
//! the snapshot version with a bounded retry, which makes the lost-update
//! race between near-simultaneous confirmations explicit.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculate::promotion::{self, FixReport, PromotionIssue};
use crate::calculate::resolver::{resolve_templates, ResolveContext};
use crate::calculate::standings::{self, TieGroup};
use crate::calculate::tiebreak::{ChainValidationError, TieBreakChain};
use crate::calculate::placement;
use crate::config::RuleConfig;
use crate::models::{Block, BlockId, Match, MatchId, MatchTemplate, PhaseKind, RankingSnapshot};
use crate::notify::{EngineEvent, EventSink};
use crate::storage::{Store, StoreError};

/// How many fresh reads a snapshot write gets before giving up.
const MAX_SNAPSHOT_RETRIES: usize = 3;

/// Hard faults. Business anomalies (ties, mismatches, malformed scores)
/// travel inside reports and events instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    InvalidChain(#[from] ChainValidationError),

    #[error("snapshot for block {block_id} kept changing, gave up after {attempts} attempts")]
    SnapshotContention { block_id: BlockId, attempts: usize },
}

/// Outcome of one validation/fix pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub issues: Vec<PromotionIssue>,
    pub fixes: FixReport,
}

/// Outcome of confirming one match.
#[derive(Debug)]
pub struct ConfirmReport {
    pub block_id: BlockId,

    /// New snapshot version, when a recompute or placement wrote one
    pub snapshot_version: Option<u64>,

    /// Tie groups surfaced by the recompute
    pub unresolved_ties: usize,

    pub validation: ValidationReport,

    /// Whether final placements were written
    pub placements_updated: bool,
}

/// The engine's orchestrator.
pub struct Pipeline {
    store: Arc<dyn Store>,
    sink: Arc<dyn EventSink>,
    config: RuleConfig,
    chain: Option<TieBreakChain>,
}

impl Pipeline {
    /// Build a pipeline, validating the configured tie-break chain up
    /// front. An invalid chain is rejected here, before any standings are
    /// computed with it.
    pub fn new(
        store: Arc<dyn Store>,
        sink: Arc<dyn EventSink>,
        config: RuleConfig,
    ) -> Result<Self, PipelineError> {
        let chain = if config.tiebreak.is_empty() {
            None
        } else {
            Some(TieBreakChain::validate(
                &config.tiebreak,
                &config.sport_rules(),
            )?)
        };

        Ok(Self {
            store,
            sink,
            config,
            chain,
        })
    }

    /// React to a match's result being confirmed.
    ///
    /// Round-robin: recompute the owning block's ranking, then re-promote
    /// every slot reading from the block. Elimination: write any final
    /// placements the match decides, then re-promote the slots reading
    /// from this match or from its block.
    pub async fn match_confirmed(&self, match_id: &MatchId) -> Result<ConfirmReport, PipelineError> {
        let m = self.store.match_by_id(match_id).await?;
        let block = self.store.block(&m.block_id).await?;

        info!(code = %m.code, block = %block.code, phase = %block.phase, "match confirmed");

        match block.phase {
            PhaseKind::RoundRobin => {
                let (version, ties) = self.recompute_block(&block).await?;
                let block_code = block.code.clone();
                let validation = self
                    .run_validation(|t| t.references_block(&block_code))
                    .await?;

                Ok(ConfirmReport {
                    block_id: block.id,
                    snapshot_version: Some(version),
                    unresolved_ties: ties.len(),
                    validation,
                    placements_updated: false,
                })
            }
            PhaseKind::Elimination => {
                let templates = self.store.templates().await?;
                let template = templates.iter().find(|t| t.match_code == m.code);

                let placements_updated = match template {
                    Some(template) if template.has_placements() => {
                        self.apply_placements(&block, template, &m).await?
                    }
                    _ => false,
                };

                let code = m.code.clone();
                let block_code = block.code.clone();
                let validation = self
                    .run_validation(|t| {
                        t.references_match(&code) || t.references_block(&block_code)
                    })
                    .await?;

                let snapshot_version = if placements_updated {
                    Some(self.store.snapshot(&block.id).await?.version)
                } else {
                    None
                };

                Ok(ConfirmReport {
                    block_id: block.id,
                    snapshot_version,
                    unresolved_ties: 0,
                    validation,
                    placements_updated,
                })
            }
        }
    }

    /// React to an override being created, updated, or deleted: re-run the
    /// validation/fix pass for the match codes it can affect.
    pub async fn override_changed(
        &self,
        match_codes: &[String],
    ) -> Result<ValidationReport, PipelineError> {
        debug!(?match_codes, "override changed, revalidating affected slots");
        self.run_validation(|t| match_codes.iter().any(|c| *c == t.match_code))
            .await
    }

    /// Full idempotent pass over every elimination template.
    pub async fn revalidate_all(&self) -> Result<ValidationReport, PipelineError> {
        self.run_validation(|_| true).await
    }

    /// Recompute one block's standings and replace its snapshot.
    async fn recompute_block(
        &self,
        block: &Block,
    ) -> Result<(u64, Vec<TieGroup>), PipelineError> {
        let teams = self.store.block_teams(&block.id).await?;

        for attempt in 1..=MAX_SNAPSHOT_RETRIES {
            let current = self.store.snapshot(&block.id).await?;
            let matches = self.store.block_matches(&block.id).await?;

            let outcome = standings::calculate(
                &teams,
                &matches,
                &self.config.points,
                &self.config.walkover,
                self.chain.as_ref(),
            );

            let snapshot = RankingSnapshot {
                block_id: block.id.clone(),
                version: current.version,
                standings: outcome.standings,
                computed_at: Utc::now(),
            };

            match self.store.replace_snapshot(snapshot, current.version).await {
                Ok(version) => {
                    for group in &outcome.unresolved {
                        self.sink.emit(EngineEvent::TieUnresolved {
                            block_id: block.id.clone(),
                            team_ids: group.team_ids.clone(),
                            chain: self.chain_labels(),
                        });
                    }
                    return Ok((version, outcome.unresolved));
                }
                Err(StoreError::VersionConflict { .. }) => {
                    warn!(block = %block.code, attempt, "snapshot changed during recompute, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(PipelineError::SnapshotContention {
            block_id: block.id.clone(),
            attempts: MAX_SNAPSHOT_RETRIES,
        })
    }

    /// Write final placements for a confirmed elimination match.
    async fn apply_placements(
        &self,
        block: &Block,
        template: &MatchTemplate,
        m: &Match,
    ) -> Result<bool, PipelineError> {
        for attempt in 1..=MAX_SNAPSHOT_RETRIES {
            let current = self.store.snapshot(&block.id).await?;

            let Some(standings) = placement::assign(template, m, &current) else {
                return Ok(false);
            };

            let snapshot = RankingSnapshot {
                block_id: block.id.clone(),
                version: current.version,
                standings,
                computed_at: Utc::now(),
            };

            match self.store.replace_snapshot(snapshot, current.version).await {
                Ok(_) => return Ok(true),
                Err(StoreError::VersionConflict { .. }) => {
                    warn!(block = %block.code, attempt, "snapshot changed during placement, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(PipelineError::SnapshotContention {
            block_id: block.id.clone(),
            attempts: MAX_SNAPSHOT_RETRIES,
        })
    }

    /// Resolve, validate, and fix the templates selected by `keep`.
    async fn run_validation(
        &self,
        keep: impl Fn(&MatchTemplate) -> bool,
    ) -> Result<ValidationReport, PipelineError> {
        let blocks = self.store.blocks().await?;
        let snapshots = self.store.snapshots().await?;
        let teams = self.store.teams().await?;
        let matches = self.store.matches().await?;
        let overrides = self.store.overrides().await?;

        let templates: Vec<MatchTemplate> = self
            .store
            .templates()
            .await?
            .into_iter()
            .filter(|t| keep(t))
            .collect();

        let ctx = ResolveContext {
            blocks: &blocks,
            snapshots: &snapshots,
            teams: &teams,
            matches: &matches,
            overrides: &overrides,
        };

        let resolved = resolve_templates(&templates, &ctx);
        let issues = promotion::validate(&resolved, &matches);

        for issue in &issues {
            self.sink.emit(EngineEvent::PromotionMismatch {
                match_code: issue.match_code.clone(),
                side: issue.side,
                severity: issue.severity,
                expected_team: issue.expected_team_name.clone(),
                actual_team: issue.current_display.clone(),
            });
        }

        let (planned, skipped) = promotion::plan_fixes(&issues);
        let mut fixes = FixReport {
            skipped,
            ..FixReport::default()
        };

        for fix in planned {
            match self
                .store
                .update_match_slot(&fix.match_code, fix.side, &fix.team_id, &fix.team_name)
                .await
            {
                Ok(()) => fixes.fixed.push(fix),
                Err(e) => {
                    warn!(code = %fix.match_code, side = %fix.side, "slot fix failed: {}", e);
                    fixes.failed.push((fix, e.to_string()));
                }
            }
        }

        if !fixes.fixed.is_empty() {
            info!(
                fixed = fixes.fixed.len(),
                skipped = fixes.skipped,
                "promoted teams into bracket slots"
            );
        }

        Ok(ValidationReport { issues, fixes })
    }

    fn chain_labels(&self) -> Vec<String> {
        let default_chain;
        let chain = match &self.chain {
            Some(c) => c,
            None => {
                default_chain = TieBreakChain::default_order();
                &default_chain
            }
        };
        chain.criteria().iter().map(|c| c.to_string()).collect()
    }
}
