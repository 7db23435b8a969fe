#![forbid(unsafe_code)]
//! dtprune-config: loading criterion and pruner parameters.
//!
//! Sources: YAML/JSON documents, files, and `DTPRUNE_*` environment
//! variables. Every loader funnels into `PrunerConfig::build`, which fails on
//! the first missing or invalid parameter so no partially configured pruner
//! ever reaches a traversal.

pub mod criterion;
pub mod env;
pub mod error;
pub mod pruner;

pub use criterion::CriterionConfig;
pub use error::{Error, Result};
pub use pruner::PrunerConfig;
