//! Pruner configuration from environment variables.
//!
//! Environment variables:
//! - `DTPRUNE_CRITERION`: criterion kind (required)
//! - `DTPRUNE_EPSILON`, `DTPRUNE_MAX_ERROR`, `DTPRUNE_STEEPNESS`,
//!   `DTPRUNE_MIN_ERROR`: criterion parameters
//! - `DTPRUNE_VERIFY`: `checked` / `unchecked`
//! - `DTPRUNE_TOLERANCE_SOURCE`: `remaining` (default) / `configured`
//!
//! Unlike engine-style env overrides, values that fail to parse are errors:
//! a criterion must never be built from a silently dropped parameter.

use dtprune_core::{CriterionKind, ToleranceSource, VerifyMode};

use crate::criterion::CriterionConfig;
use crate::error::{Error, Result};
use crate::pruner::PrunerConfig;

pub const CRITERION_VAR: &str = "DTPRUNE_CRITERION";
pub const EPSILON_VAR: &str = "DTPRUNE_EPSILON";
pub const MAX_ERROR_VAR: &str = "DTPRUNE_MAX_ERROR";
pub const STEEPNESS_VAR: &str = "DTPRUNE_STEEPNESS";
pub const MIN_ERROR_VAR: &str = "DTPRUNE_MIN_ERROR";
pub const VERIFY_VAR: &str = "DTPRUNE_VERIFY";
pub const TOLERANCE_SOURCE_VAR: &str = "DTPRUNE_TOLERANCE_SOURCE";

impl PrunerConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|var| std::env::var(var).ok())
    }

    /// Read variables through `lookup` (tests pass a map instead of touching
    /// the process environment).
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind = lookup(CRITERION_VAR).ok_or_else(|| {
            dtprune_core::Error::Config(format!("{CRITERION_VAR} is not set"))
        })?;
        let kind: CriterionKind = kind.parse()?;

        let float = |var: &'static str| -> Result<Option<f64>> {
            match lookup(var) {
                None => Ok(None),
                Some(value) => value.trim().parse::<f64>().map(Some).map_err(|_| Error::Env {
                    var,
                    value,
                    expected: "number",
                }),
            }
        };

        let criterion = CriterionConfig {
            epsilon: float(EPSILON_VAR)?,
            max_error: float(MAX_ERROR_VAR)?,
            steepness: float(STEEPNESS_VAR)?,
            min_error: float(MIN_ERROR_VAR)?,
            ..CriterionConfig::new(kind)
        };

        let verify = match lookup(VERIFY_VAR) {
            None => None,
            Some(value) => Some(value.parse::<VerifyMode>().map_err(|_| Error::Env {
                var: VERIFY_VAR,
                value,
                expected: "verify mode",
            })?),
        };

        let tolerance_source = match lookup(TOLERANCE_SOURCE_VAR) {
            None => ToleranceSource::default(),
            Some(value) => value.parse::<ToleranceSource>().map_err(|_| Error::Env {
                var: TOLERANCE_SOURCE_VAR,
                value,
                expected: "tolerance source",
            })?,
        };

        Ok(PrunerConfig {
            criterion,
            verify,
            tolerance_source,
        })
    }
}
