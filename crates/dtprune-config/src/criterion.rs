//! Serializable criterion parameters.
//!
//! Example:
//! ```yaml
//! kind: exponential
//! max_error: 0.5
//! steepness: 2.0
//! min_error: 0.01
//! ```
//!
//! Every numeric field is optional at the serde layer so a missing one is
//! reported by name (`MissingParameter`) when the criterion is built, rather
//! than as a generic parse failure.

use serde::{Deserialize, Serialize};

use dtprune_core::{CriterionKind, ErrorCriterion, ParamSource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CriterionConfig {
    pub kind: CriterionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_error: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steepness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_error: Option<f64>,
}

impl CriterionConfig {
    /// Config with no parameters set.
    pub fn new(kind: CriterionKind) -> Self {
        Self {
            kind,
            epsilon: None,
            max_error: None,
            steepness: None,
            min_error: None,
        }
    }

    /// Build the criterion, failing on the first missing or invalid field.
    pub fn build(&self) -> dtprune_core::Result<ErrorCriterion> {
        ErrorCriterion::from_params(self.kind, self)
    }
}

impl ParamSource for CriterionConfig {
    fn param(&self, name: &str) -> Option<f64> {
        match name {
            "epsilon" => self.epsilon,
            "max_error" => self.max_error,
            "steepness" => self.steepness,
            "min_error" => self.min_error,
            _ => None,
        }
    }
}

impl From<&ErrorCriterion> for CriterionConfig {
    fn from(c: &ErrorCriterion) -> Self {
        let mut cfg = CriterionConfig::new(c.kind());
        match *c {
            ErrorCriterion::Absolute { epsilon } | ErrorCriterion::Relative { epsilon } => {
                cfg.epsilon = Some(epsilon);
            }
            ErrorCriterion::Exponential {
                max_error,
                steepness,
                min_error,
            }
            | ErrorCriterion::Gaussian {
                max_error,
                steepness,
                min_error,
            } => {
                cfg.max_error = Some(max_error);
                cfg.steepness = Some(steepness);
                cfg.min_error = Some(min_error);
            }
            ErrorCriterion::Hybrid { steepness, epsilon } => {
                cfg.steepness = Some(steepness);
                cfg.epsilon = Some(epsilon);
            }
        }
        cfg
    }
}
