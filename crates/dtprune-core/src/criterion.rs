//! Error criteria: policies mapping the current bounds of a query quantity to
//! a per-reference error tolerance.
//!
//! The five variants form a closed set. Each carries only the parameters its
//! formula reads; the shared prune arithmetic lives in `decision`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Variant tag of an [`ErrorCriterion`], used by configuration layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionKind {
    Absolute,
    Relative,
    Exponential,
    Gaussian,
    Hybrid,
}

impl CriterionKind {
    pub const ALL: [CriterionKind; 5] = [
        CriterionKind::Absolute,
        CriterionKind::Relative,
        CriterionKind::Exponential,
        CriterionKind::Gaussian,
        CriterionKind::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CriterionKind::Absolute => "absolute",
            CriterionKind::Relative => "relative",
            CriterionKind::Exponential => "exponential",
            CriterionKind::Gaussian => "gaussian",
            CriterionKind::Hybrid => "hybrid",
        }
    }

    /// Parameter names that must be present to build this variant.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            CriterionKind::Absolute | CriterionKind::Relative => &["epsilon"],
            CriterionKind::Exponential | CriterionKind::Gaussian => {
                &["max_error", "steepness", "min_error"]
            }
            CriterionKind::Hybrid => &["steepness", "epsilon"],
        }
    }
}

impl fmt::Display for CriterionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CriterionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        CriterionKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| Error::UnknownCriterion(s.to_string()))
    }
}

/// A named-parameter lookup, the only thing a loader must provide.
pub trait ParamSource {
    fn param(&self, name: &str) -> Option<f64>;
}

impl<P: ParamSource + ?Sized> ParamSource for &P {
    fn param(&self, name: &str) -> Option<f64> {
        (**self).param(name)
    }
}

impl<S: BuildHasher> ParamSource for HashMap<String, f64, S> {
    fn param(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl ParamSource for BTreeMap<String, f64> {
    fn param(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl ParamSource for [(&str, f64)] {
    fn param(&self, name: &str) -> Option<f64> {
        self.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }
}

/// Configured error criterion. Immutable once built.
///
/// Deserializing goes through the same validation as the constructors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", try_from = "RawCriterion")]
pub enum ErrorCriterion {
    /// `epsilon / lower`: absolute guarantee on the final estimate.
    Absolute { epsilon: f64 },
    /// Constant `epsilon`: relative guarantee.
    Relative { epsilon: f64 },
    /// `max_error * exp(-steepness * upper) + min_error`.
    Exponential {
        max_error: f64,
        steepness: f64,
        min_error: f64,
    },
    /// `max_error * exp(-steepness * upper^2) + min_error`.
    Gaussian {
        max_error: f64,
        steepness: f64,
        min_error: f64,
    },
    /// Relative for large `lower`, absolute as `lower -> 0`.
    Hybrid { steepness: f64, epsilon: f64 },
}

/// Unvalidated wire form of [`ErrorCriterion`].
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RawCriterion {
    Absolute {
        epsilon: f64,
    },
    Relative {
        epsilon: f64,
    },
    Exponential {
        max_error: f64,
        steepness: f64,
        min_error: f64,
    },
    Gaussian {
        max_error: f64,
        steepness: f64,
        min_error: f64,
    },
    Hybrid {
        steepness: f64,
        epsilon: f64,
    },
}

impl TryFrom<RawCriterion> for ErrorCriterion {
    type Error = Error;

    fn try_from(raw: RawCriterion) -> Result<Self> {
        match raw {
            RawCriterion::Absolute { epsilon } => ErrorCriterion::absolute(epsilon),
            RawCriterion::Relative { epsilon } => ErrorCriterion::relative(epsilon),
            RawCriterion::Exponential {
                max_error,
                steepness,
                min_error,
            } => ErrorCriterion::exponential(max_error, steepness, min_error),
            RawCriterion::Gaussian {
                max_error,
                steepness,
                min_error,
            } => ErrorCriterion::gaussian(max_error, steepness, min_error),
            RawCriterion::Hybrid { steepness, epsilon } => {
                ErrorCriterion::hybrid(steepness, epsilon)
            }
        }
    }
}

fn checked(kind: CriterionKind, field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::InvalidParameter {
            criterion: kind.as_str(),
            field,
            value,
        })
    }
}

fn required<P: ParamSource + ?Sized>(
    src: &P,
    kind: CriterionKind,
    field: &'static str,
) -> Result<f64> {
    let value = src.param(field).ok_or(Error::MissingParameter {
        criterion: kind.as_str(),
        field,
    })?;
    checked(kind, field, value)
}

impl ErrorCriterion {
    pub fn absolute(epsilon: f64) -> Result<Self> {
        Ok(ErrorCriterion::Absolute {
            epsilon: checked(CriterionKind::Absolute, "epsilon", epsilon)?,
        })
    }

    pub fn relative(epsilon: f64) -> Result<Self> {
        Ok(ErrorCriterion::Relative {
            epsilon: checked(CriterionKind::Relative, "epsilon", epsilon)?,
        })
    }

    pub fn exponential(max_error: f64, steepness: f64, min_error: f64) -> Result<Self> {
        let kind = CriterionKind::Exponential;
        Ok(ErrorCriterion::Exponential {
            max_error: checked(kind, "max_error", max_error)?,
            steepness: checked(kind, "steepness", steepness)?,
            min_error: checked(kind, "min_error", min_error)?,
        })
    }

    pub fn gaussian(max_error: f64, steepness: f64, min_error: f64) -> Result<Self> {
        let kind = CriterionKind::Gaussian;
        Ok(ErrorCriterion::Gaussian {
            max_error: checked(kind, "max_error", max_error)?,
            steepness: checked(kind, "steepness", steepness)?,
            min_error: checked(kind, "min_error", min_error)?,
        })
    }

    pub fn hybrid(steepness: f64, epsilon: f64) -> Result<Self> {
        let kind = CriterionKind::Hybrid;
        Ok(ErrorCriterion::Hybrid {
            steepness: checked(kind, "steepness", steepness)?,
            epsilon: checked(kind, "epsilon", epsilon)?,
        })
    }

    /// Build a criterion of `kind` from named parameters.
    ///
    /// Every field listed by [`CriterionKind::required_fields`] must be present;
    /// nothing is defaulted. Extra parameters are ignored (an `epsilon` handed to
    /// the exponential/gaussian variants has no effect, their baseline is 0).
    pub fn from_params<P: ParamSource + ?Sized>(kind: CriterionKind, src: &P) -> Result<Self> {
        let criterion = match kind {
            CriterionKind::Absolute => ErrorCriterion::Absolute {
                epsilon: required(src, kind, "epsilon")?,
            },
            CriterionKind::Relative => ErrorCriterion::Relative {
                epsilon: required(src, kind, "epsilon")?,
            },
            CriterionKind::Exponential => ErrorCriterion::Exponential {
                max_error: required(src, kind, "max_error")?,
                steepness: required(src, kind, "steepness")?,
                min_error: required(src, kind, "min_error")?,
            },
            CriterionKind::Gaussian => ErrorCriterion::Gaussian {
                max_error: required(src, kind, "max_error")?,
                steepness: required(src, kind, "steepness")?,
                min_error: required(src, kind, "min_error")?,
            },
            CriterionKind::Hybrid => ErrorCriterion::Hybrid {
                steepness: required(src, kind, "steepness")?,
                epsilon: required(src, kind, "epsilon")?,
            },
        };
        Ok(criterion)
    }

    pub fn kind(&self) -> CriterionKind {
        match self {
            ErrorCriterion::Absolute { .. } => CriterionKind::Absolute,
            ErrorCriterion::Relative { .. } => CriterionKind::Relative,
            ErrorCriterion::Exponential { .. } => CriterionKind::Exponential,
            ErrorCriterion::Gaussian { .. } => CriterionKind::Gaussian,
            ErrorCriterion::Hybrid { .. } => CriterionKind::Hybrid,
        }
    }

    /// Starting value of a budget's `remaining_epsilon`.
    ///
    /// The configured epsilon for absolute/relative/hybrid; the exponential and
    /// gaussian variants start from an additive baseline of 0.
    pub fn epsilon(&self) -> f64 {
        match *self {
            ErrorCriterion::Absolute { epsilon }
            | ErrorCriterion::Relative { epsilon }
            | ErrorCriterion::Hybrid { epsilon, .. } => epsilon,
            ErrorCriterion::Exponential { .. } | ErrorCriterion::Gaussian { .. } => 0.0,
        }
    }

    /// Per-reference tolerance for the bounds `[lower, upper]`, using the
    /// configured epsilon.
    #[inline]
    pub fn tolerance(&self, upper: f64, lower: f64) -> f64 {
        self.tolerance_with(upper, lower, self.epsilon())
    }

    /// Same formula with an explicit epsilon term (e.g. a budget's remaining one).
    ///
    /// `lower` must be > 0 for the absolute and hybrid variants.
    #[inline]
    pub fn tolerance_with(&self, upper: f64, lower: f64, epsilon: f64) -> f64 {
        match *self {
            ErrorCriterion::Absolute { .. } => epsilon / lower,
            ErrorCriterion::Relative { .. } => epsilon,
            ErrorCriterion::Exponential {
                max_error,
                steepness,
                min_error,
            } => max_error * (-steepness * upper).exp() + min_error + epsilon,
            ErrorCriterion::Gaussian {
                max_error,
                steepness,
                min_error,
            } => max_error * (-steepness * upper * upper).exp() + min_error + epsilon,
            ErrorCriterion::Hybrid { steepness, .. } => {
                (1.0 - (-steepness * lower).exp()) * epsilon
                    + (-steepness * upper).exp() * epsilon / lower
            }
        }
    }
}

impl fmt::Display for ErrorCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ErrorCriterion::Absolute { epsilon } => write!(f, "absolute(epsilon={epsilon})"),
            ErrorCriterion::Relative { epsilon } => write!(f, "relative(epsilon={epsilon})"),
            ErrorCriterion::Exponential {
                max_error,
                steepness,
                min_error,
            } => write!(
                f,
                "exponential(max_error={max_error}, steepness={steepness}, min_error={min_error})"
            ),
            ErrorCriterion::Gaussian {
                max_error,
                steepness,
                min_error,
            } => write!(
                f,
                "gaussian(max_error={max_error}, steepness={steepness}, min_error={min_error})"
            ),
            ErrorCriterion::Hybrid { steepness, epsilon } => {
                write!(f, "hybrid(steepness={steepness}, epsilon={epsilon})")
            }
        }
    }
}
