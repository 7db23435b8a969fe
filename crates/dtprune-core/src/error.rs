use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("criterion '{criterion}' requires parameter '{field}'")]
    MissingParameter {
        criterion: &'static str,
        field: &'static str,
    },

    #[error("criterion '{criterion}': parameter '{field}' must be finite and non-negative, got {value}")]
    InvalidParameter {
        criterion: &'static str,
        field: &'static str,
        value: f64,
    },

    #[error("unknown error criterion '{0}' (expected absolute, relative, exponential, gaussian or hybrid)")]
    UnknownCriterion(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl Error {
    /// True for errors raised while setting a criterion up (never during traversal).
    pub fn is_config(&self) -> bool {
        !matches!(self, Error::Invariant(_))
    }
}

/// Arithmetic invariants of the prune decision.
///
/// Any of these means the caller handed in inconsistent bounds/counts or the
/// arithmetic went non-finite. They are defects, not recoverable conditions.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("max error incurred is negative ({max_error}): upper bound {q_upper} < lower bound {q_lower}")]
    NegativeMaxError {
        max_error: f64,
        q_upper: f64,
        q_lower: f64,
    },

    #[error("criterion tolerance {tolerance} is negative or NaN")]
    InvalidTolerance { tolerance: f64 },

    #[error("allowed error {allowed_error} is negative or NaN")]
    NegativeAllowedError { allowed_error: f64 },

    #[error("query count underflow: pruning {reference_count} references with only {remaining} remaining")]
    QueryCountUnderflow { remaining: u64, reference_count: u64 },
}
