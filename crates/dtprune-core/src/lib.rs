#![forbid(unsafe_code)]
//! dtprune-core: error budgets and pruning criteria for approximate dual-tree
//! algorithms.
//!
//! Responsibilities:
//! - Per-query-node `ErrorBudget` (remaining error, remaining count).
//! - The closed set of error criteria (`ErrorCriterion`).
//! - The shared prune decision (`decision`) and the `Pruner` that applies it
//!   in checked or unchecked mode.
//! - Optional counters (`tracking`) and debug-time assertions (`verify`).
//!
//! **No I/O, no tree geometry, no traversal** here. The engine owns the trees
//! and calls `Pruner::can_prune` once per visited reference node.

pub mod budget;
pub mod criterion;
pub mod decision;
pub mod error;
pub mod prelude;
pub mod prune;
pub mod tracking;
pub mod verify;

pub use budget::ErrorBudget;
pub use criterion::{CriterionKind, ErrorCriterion, ParamSource};
pub use decision::Assessment;
pub use error::{Error, InvariantViolation, Result};
pub use prune::{Pruner, ToleranceSource, VerifyMode};
pub use tracking::{PruneStats, PruneStatsSnapshot};
