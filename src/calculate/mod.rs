//! The computation core.
//!
//! Pure functions over explicit inputs — no store access, no shared state:
//! - **score**: raw score normalization
//! - **tiebreak**: rule chain validation and application
//! - **standings**: block ranking calculation
//! - **resolver**: symbolic slot resolution
//! - **promotion**: slot validation and fix planning
//! - **placement**: final position assignment
//!
//! The `pipeline` module wires these to the store and event sink.

pub mod placement;
pub mod promotion;
pub mod resolver;
pub mod score;
pub mod standings;
pub mod tiebreak;

pub use promotion::{FixReport, PromotionIssue, Severity, SlotFix};
pub use resolver::{ExpectedTeam, ResolveContext, ResolvedSlot};
pub use score::NormalizedScore;
pub use standings::{StandingsOutcome, TieGroup};
pub use tiebreak::{ChainValidationError, ChainViolation, TieBreakChain, TieBreakContext};
