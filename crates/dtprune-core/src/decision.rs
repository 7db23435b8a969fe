//! The shared prune arithmetic.
//!
//! For a candidate (query node, reference node) pair with bounds
//! `[q_lower, q_upper]` and `reference_count` references:
//!
//! ```text
//! max_error_incurred = 0.5 * (q_upper - q_lower)
//! allowed_error      = q_lower * tolerance * reference_count / remaining_query_count
//! prune             <=> max_error_incurred < allowed_error
//! ```
//!
//! `Assessment` only computes; applying the result to a budget is done by
//! `Pruner`.

use crate::error::InvariantViolation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub max_error_incurred: f64,
    pub tolerance: f64,
    pub allowed_error: f64,
}

impl Assessment {
    #[inline]
    pub fn compute(
        q_upper: f64,
        q_lower: f64,
        tolerance: f64,
        reference_count: u64,
        remaining_query_count: u64,
    ) -> Self {
        let max_error_incurred = 0.5 * (q_upper - q_lower);
        let allowed_error =
            q_lower * tolerance * reference_count as f64 / remaining_query_count as f64;
        Self {
            max_error_incurred,
            tolerance,
            allowed_error,
        }
    }

    #[inline]
    pub fn permits_pruning(&self) -> bool {
        self.max_error_incurred < self.allowed_error
    }

    /// Check the sign invariants. NaN fails every check.
    pub fn validate(&self, q_upper: f64, q_lower: f64) -> Result<(), InvariantViolation> {
        if self.max_error_incurred.is_nan() || self.max_error_incurred < 0.0 {
            return Err(InvariantViolation::NegativeMaxError {
                max_error: self.max_error_incurred,
                q_upper,
                q_lower,
            });
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(InvariantViolation::InvalidTolerance {
                tolerance: self.tolerance,
            });
        }
        if self.allowed_error.is_nan() || self.allowed_error < 0.0 {
            return Err(InvariantViolation::NegativeAllowedError {
                allowed_error: self.allowed_error,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_scenario_rejects() {
        let a = Assessment::compute(10.0, 8.0, 0.1, 5, 20);
        assert_eq!(a.max_error_incurred, 1.0);
        assert!((a.allowed_error - 0.2).abs() < 1e-12);
        assert!(!a.permits_pruning());
        assert!(a.validate(10.0, 8.0).is_ok());
    }

    #[test]
    fn tie_does_not_prune() {
        // 0.5 * (3 - 1) == 1 * 1 * 1 / 1
        let a = Assessment::compute(3.0, 1.0, 1.0, 1, 1);
        assert_eq!(a.max_error_incurred, a.allowed_error);
        assert!(!a.permits_pruning());
    }

    #[test]
    fn inverted_bounds_are_a_violation() {
        let a = Assessment::compute(1.0, 2.0, 0.1, 1, 1);
        assert!(matches!(
            a.validate(1.0, 2.0),
            Err(InvariantViolation::NegativeMaxError { .. })
        ));
    }

    #[test]
    fn nan_allowed_error_is_a_violation() {
        // zero lower bound times infinite tolerance
        let a = Assessment::compute(1.0, 0.0, f64::INFINITY, 1, 1);
        assert!(matches!(
            a.validate(1.0, 0.0),
            Err(InvariantViolation::NegativeAllowedError { .. })
        ));
    }

    #[test]
    fn negative_tolerance_is_a_violation() {
        let a = Assessment::compute(1.0, 1.0, -0.5, 1, 1);
        assert!(matches!(
            a.validate(1.0, 1.0),
            Err(InvariantViolation::InvalidTolerance { .. })
        ));
    }
}
