//! Debug-time verification helpers for traversal engines.
//!
//! Cheap assertions to call at node boundaries in tests and debug builds.
//! They panic with a descriptive message; the prune path itself reports
//! violations through `Error::Invariant` instead.

use crate::budget::ErrorBudget;

/// Bounds must be ordered and not NaN.
pub fn assert_bounds_ordered(q_upper: f64, q_lower: f64) {
    assert!(
        q_upper >= q_lower,
        "bounds out of order: upper {q_upper} < lower {q_lower}"
    );
}

/// A budget never holds more references than its node was created with, and
/// never reports more consumed error than pruning could have charged.
pub fn assert_budget_consistent(budget: &ErrorBudget, created_with: u64) {
    assert!(
        budget.remaining_query_count() <= created_with,
        "remaining query count {} exceeds creation count {}",
        budget.remaining_query_count(),
        created_with
    );
    assert!(
        budget.consumed_epsilon() >= 0.0,
        "consumed epsilon is negative ({})",
        budget.consumed_epsilon()
    );
}

/// Total error bound for a fully processed query node.
///
/// When every pruned pair was approximated by the midpoint of its bounds,
/// the estimate is off by at most the error the budget was charged.
pub fn assert_within_budget(estimate: f64, exact: f64, budget: &ErrorBudget, slack: f64) {
    let err = (estimate - exact).abs();
    assert!(
        err <= budget.consumed_epsilon() + slack,
        "estimate error {err} exceeds charged error {}",
        budget.consumed_epsilon()
    );
}
