//! # Tourney Engine
//!
//! Standings, tie-break resolution, and bracket promotion for multi-stage
//! tournaments: round-robin blocks feeding a single-elimination bracket.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (teams, blocks, matches, templates,
//!   overrides, ranking snapshots)
//! - **calculate**: Pure computation (score normalization, tie-break
//!   chains, standings, slot resolution, promotion validation, placement)
//! - **pipeline**: Orchestration of recompute/promote flows against the
//!   store and event sink
//! - **storage**: Store trait, in-memory store, JSONL fixture files
//! - **notify**: Structured operator-facing events
//! - **config**: Rule configuration loading and validation

pub mod calculate;
pub mod config;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod storage;

pub use models::*;
