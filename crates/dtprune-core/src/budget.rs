//! Per-query-node error budget.
//!
//! One `ErrorBudget` is owned by exactly one query node for its lifetime. It
//! records how much error the node may still incur and how many references
//! are still unaccounted for. Only the prune decision mutates it.

use serde::{Deserialize, Serialize};

use crate::criterion::ErrorCriterion;
use crate::error::InvariantViolation;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorBudget {
    remaining_epsilon: f64,
    initial_epsilon: f64,
    remaining_query_count: u64,
}

impl ErrorBudget {
    /// Explicit epsilon and count, bypassing the criterion. Engines go through
    /// [`ErrorBudget::leaf`] / [`ErrorBudget::internal`].
    pub(crate) fn new(epsilon: f64, count: u64) -> Self {
        Self {
            remaining_epsilon: epsilon,
            initial_epsilon: epsilon,
            remaining_query_count: count,
        }
    }

    /// Budget for a leaf query node holding `count` points.
    pub fn leaf(criterion: &ErrorCriterion, count: u64) -> Self {
        Self::new(criterion.epsilon(), count)
    }

    /// Budget for an internal query node created by merging `left` and `right`.
    ///
    /// The budget is reset to `count`; the children's remaining budgets are
    /// inspected only and never folded into the parent.
    pub fn internal(
        criterion: &ErrorCriterion,
        count: u64,
        left: &ErrorBudget,
        right: &ErrorBudget,
    ) -> Self {
        #[cfg(feature = "tracing")]
        tracing::trace!(
            count,
            left_remaining = left.remaining_query_count,
            right_remaining = right.remaining_query_count,
            left_epsilon = left.remaining_epsilon,
            right_epsilon = right.remaining_epsilon,
            "internal query node budget reset"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (left, right);

        Self::leaf(criterion, count)
    }

    pub fn remaining_epsilon(&self) -> f64 {
        self.remaining_epsilon
    }

    /// Error charged to this budget so far.
    pub fn consumed_epsilon(&self) -> f64 {
        self.initial_epsilon - self.remaining_epsilon
    }

    pub fn remaining_query_count(&self) -> u64 {
        self.remaining_query_count
    }

    /// Overwrite the remaining count, returning the previous value.
    ///
    /// The unsigned type keeps the count non-negative; callers that compute the
    /// new value by subtraction should use `checked_sub` on their side.
    pub fn set_remaining_query_count(&mut self, count: u64) -> u64 {
        std::mem::replace(&mut self.remaining_query_count, count)
    }

    /// Every reference has been accounted for.
    pub fn is_resolved(&self) -> bool {
        self.remaining_query_count == 0
    }

    /// Charge a successful prune. No state changes when it would underflow.
    pub(crate) fn charge(
        &mut self,
        max_error_incurred: f64,
        reference_count: u64,
    ) -> Result<(), InvariantViolation> {
        let remaining = self
            .remaining_query_count
            .checked_sub(reference_count)
            .ok_or(InvariantViolation::QueryCountUnderflow {
                remaining: self.remaining_query_count,
                reference_count,
            })?;
        self.remaining_query_count = remaining;
        self.remaining_epsilon -= max_error_incurred;
        Ok(())
    }

    /// Fast-path charge. Correct callers never underflow; if one does, the
    /// count saturates at zero rather than wrapping.
    #[inline]
    pub(crate) fn charge_unchecked(&mut self, max_error_incurred: f64, reference_count: u64) {
        debug_assert!(
            reference_count <= self.remaining_query_count,
            "query count underflow: {} > {}",
            reference_count,
            self.remaining_query_count
        );
        self.remaining_query_count = self.remaining_query_count.saturating_sub(reference_count);
        self.remaining_epsilon -= max_error_incurred;
    }
}
