#![forbid(unsafe_code)]
//! dtprune: error-budgeted pruning for approximate dual-tree algorithms.
//!
//! Facade over the workspace crates:
//! - `dtprune-core`: budgets, criteria, and the prune decision.
//! - `dtprune-config`: YAML/JSON/env loading of pruner parameters.
//!
//! A traversal engine typically does:
//! 1. `PrunerConfig::from_path(..)?.build()?` once, before traversal.
//! 2. `pruner.leaf_budget(n)` / `pruner.internal_budget(n, &l, &r)` per query node.
//! 3. `pruner.can_prune(&mut budget, upper, lower, n_ref)?` per visited reference node.

pub use dtprune_config as config;
pub use dtprune_core::{decision, tracking, verify};

pub use dtprune_config::{CriterionConfig, PrunerConfig};
pub use dtprune_core::prelude::*;
