//! Convenient re-exports for traversal engines.

pub use crate::budget::ErrorBudget;
pub use crate::criterion::{CriterionKind, ErrorCriterion, ParamSource};
pub use crate::error::{Error, InvariantViolation, Result};
pub use crate::prune::{Pruner, ToleranceSource, VerifyMode};
pub use crate::tracking::{PruneStats, PruneStatsSnapshot};
