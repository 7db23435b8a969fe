//! `Pruner`: a configured criterion plus the decision policy the traversal
//! engine calls once per visited reference node.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::budget::ErrorBudget;
use crate::criterion::ErrorCriterion;
use crate::decision::Assessment;
use crate::error::{Error, InvariantViolation, Result};
use crate::tracking::PruneStats;

/// Whether `can_prune` validates the decision arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// Every invariant is checked and reported as `Error::Invariant`.
    Checked,
    /// Invariants are only `debug_assert!`ed.
    Unchecked,
}

impl Default for VerifyMode {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            VerifyMode::Checked
        } else {
            VerifyMode::Unchecked
        }
    }
}

impl FromStr for VerifyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checked" | "on" | "true" | "1" => Ok(VerifyMode::Checked),
            "unchecked" | "off" | "false" | "0" => Ok(VerifyMode::Unchecked),
            other => Err(Error::Config(format!("unknown verify mode '{other}'"))),
        }
    }
}

impl fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerifyMode::Checked => "checked",
            VerifyMode::Unchecked => "unchecked",
        })
    }
}

/// Which epsilon feeds the tolerance formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToleranceSource {
    /// The budget's `remaining_epsilon`, so error already charged to a query
    /// node tightens every later decision for it. Once the budget is spent the
    /// tolerance is clamped to zero and nothing more prunes.
    #[default]
    Remaining,
    /// The criterion's configured epsilon on every call; the budget only
    /// accounts for consumed error and may go negative.
    Configured,
}

impl FromStr for ToleranceSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "configured" => Ok(ToleranceSource::Configured),
            "remaining" => Ok(ToleranceSource::Remaining),
            other => Err(Error::Config(format!("unknown tolerance source '{other}'"))),
        }
    }
}

/// Deserializable, but the criterion is validated on the way in, so a loaded
/// pruner is as trustworthy as one built with [`Pruner::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pruner {
    criterion: ErrorCriterion,
    #[serde(default)]
    verify: VerifyMode,
    #[serde(default)]
    tolerance_source: ToleranceSource,
}

impl From<ErrorCriterion> for Pruner {
    fn from(criterion: ErrorCriterion) -> Self {
        Self::new(criterion)
    }
}

impl Pruner {
    pub fn new(criterion: ErrorCriterion) -> Self {
        Self {
            criterion,
            verify: VerifyMode::default(),
            tolerance_source: ToleranceSource::default(),
        }
    }

    pub fn with_verify(mut self, verify: VerifyMode) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_tolerance_source(mut self, source: ToleranceSource) -> Self {
        self.tolerance_source = source;
        self
    }

    pub fn criterion(&self) -> &ErrorCriterion {
        &self.criterion
    }

    pub fn verify(&self) -> VerifyMode {
        self.verify
    }

    pub fn tolerance_source(&self) -> ToleranceSource {
        self.tolerance_source
    }

    /// Budget for a new leaf query node.
    pub fn leaf_budget(&self, count: u64) -> ErrorBudget {
        ErrorBudget::leaf(&self.criterion, count)
    }

    /// Budget for a new internal query node (reset to `count`).
    pub fn internal_budget(
        &self,
        count: u64,
        left: &ErrorBudget,
        right: &ErrorBudget,
    ) -> ErrorBudget {
        ErrorBudget::internal(&self.criterion, count, left, right)
    }

    /// Decide whether the reference subtree can be pruned for this query node,
    /// charging `budget` when it can.
    ///
    /// In `Checked` mode an invariant violation is returned as an error and the
    /// budget is left untouched. In `Unchecked` mode this never errors.
    pub fn can_prune(
        &self,
        budget: &mut ErrorBudget,
        q_upper: f64,
        q_lower: f64,
        reference_count: u64,
    ) -> Result<bool> {
        match self.verify {
            VerifyMode::Checked => self
                .can_prune_checked(budget, q_upper, q_lower, reference_count)
                .map_err(Error::from),
            VerifyMode::Unchecked => {
                Ok(self.can_prune_unchecked(budget, q_upper, q_lower, reference_count))
            }
        }
    }

    /// `can_prune` that also feeds `stats`.
    pub fn can_prune_recorded(
        &self,
        budget: &mut ErrorBudget,
        q_upper: f64,
        q_lower: f64,
        reference_count: u64,
        stats: &PruneStats,
    ) -> Result<bool> {
        stats.record_attempt();
        let before = budget.remaining_epsilon();
        match self.can_prune(budget, q_upper, q_lower, reference_count) {
            Ok(true) => {
                stats.record_prune(reference_count, before - budget.remaining_epsilon());
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(e) => {
                stats.record_violation();
                Err(e)
            }
        }
    }

    /// Always-validating decision.
    pub fn can_prune_checked(
        &self,
        budget: &mut ErrorBudget,
        q_upper: f64,
        q_lower: f64,
        reference_count: u64,
    ) -> std::result::Result<bool, InvariantViolation> {
        let a = self.assess(budget, q_upper, q_lower, reference_count);
        let verdict = a.validate(q_upper, q_lower).and_then(|()| {
            if a.permits_pruning() {
                budget.charge(a.max_error_incurred, reference_count)?;
                Ok(true)
            } else {
                Ok(false)
            }
        });

        match verdict {
            Ok(pruned) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    criterion = %self.criterion.kind(),
                    q_upper,
                    q_lower,
                    reference_count,
                    max_error = a.max_error_incurred,
                    allowed_error = a.allowed_error,
                    pruned,
                    remaining = budget.remaining_query_count(),
                    "prune decision"
                );
                Ok(pruned)
            }
            Err(v) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    criterion = %self.criterion.kind(),
                    q_upper,
                    q_lower,
                    reference_count,
                    remaining = budget.remaining_query_count(),
                    violation = %v,
                    "prune invariant violated"
                );
                Err(v)
            }
        }
    }

    /// Fast path: invariants are only debug-asserted.
    #[inline]
    pub fn can_prune_unchecked(
        &self,
        budget: &mut ErrorBudget,
        q_upper: f64,
        q_lower: f64,
        reference_count: u64,
    ) -> bool {
        let a = self.assess(budget, q_upper, q_lower, reference_count);
        debug_assert!(
            a.validate(q_upper, q_lower).is_ok(),
            "prune invariant violated: {:?}",
            a
        );
        if a.permits_pruning() {
            budget.charge_unchecked(a.max_error_incurred, reference_count);
            true
        } else {
            false
        }
    }

    #[inline]
    fn assess(
        &self,
        budget: &ErrorBudget,
        q_upper: f64,
        q_lower: f64,
        reference_count: u64,
    ) -> Assessment {
        let tolerance = match self.tolerance_source {
            ToleranceSource::Configured => self.criterion.tolerance(q_upper, q_lower),
            ToleranceSource::Remaining => {
                let t = self
                    .criterion
                    .tolerance_with(q_upper, q_lower, budget.remaining_epsilon());
                // A spent budget allows nothing more; NaN still fails validation.
                if t < 0.0 {
                    0.0
                } else {
                    t
                }
            }
        };
        Assessment::compute(
            q_upper,
            q_lower,
            tolerance,
            reference_count,
            budget.remaining_query_count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relative(epsilon: f64) -> Pruner {
        Pruner::new(ErrorCriterion::relative(epsilon).unwrap()).with_verify(VerifyMode::Checked)
    }

    #[test]
    fn scenario_small_epsilon_keeps_state() {
        let p = relative(0.1);
        let mut b = p.leaf_budget(20);
        let before = b;
        assert!(!p.can_prune(&mut b, 10.0, 8.0, 5).unwrap());
        assert_eq!(b, before);
    }

    #[test]
    fn scenario_large_epsilon_prunes() {
        let p = relative(2.0);
        let mut b = p.leaf_budget(20);
        assert!(p.can_prune(&mut b, 10.0, 8.0, 5).unwrap());
        assert_eq!(b.remaining_query_count(), 15);
        assert_eq!(b.remaining_epsilon(), 1.0);
        assert_eq!(b.consumed_epsilon(), 1.0);
    }

    #[test]
    fn checked_reports_underflow_and_leaves_budget() {
        let p = relative(2.0);
        let mut b = p.leaf_budget(3);
        let before = b;
        let err = p.can_prune(&mut b, 10.0, 8.0, 5).unwrap_err();
        assert_eq!(
            err,
            Error::Invariant(InvariantViolation::QueryCountUnderflow {
                remaining: 3,
                reference_count: 5
            })
        );
        assert_eq!(b, before);
    }

    #[test]
    fn checked_reports_inverted_bounds() {
        let p = relative(0.1);
        let mut b = p.leaf_budget(10);
        let err = p.can_prune(&mut b, 1.0, 2.0, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::Invariant(InvariantViolation::NegativeMaxError { .. })
        ));
        assert!(!err.is_config());
    }

    #[test]
    fn unchecked_matches_checked_on_valid_input() {
        let c = ErrorCriterion::hybrid(0.5, 0.3).unwrap();
        let checked = Pruner::new(c).with_verify(VerifyMode::Checked);
        let fast = Pruner::new(c).with_verify(VerifyMode::Unchecked);
        let mut b1 = checked.leaf_budget(100);
        let mut b2 = fast.leaf_budget(100);
        for (u, l, n) in [(4.0, 3.9, 10), (9.0, 1.0, 5), (2.0, 1.99, 40), (1.0, 0.5, 1)] {
            let r1 = checked.can_prune(&mut b1, u, l, n).unwrap();
            let r2 = fast.can_prune(&mut b2, u, l, n).unwrap();
            assert_eq!(r1, r2);
            assert_eq!(b1, b2);
        }
    }

    #[test]
    fn default_pruner_refuses_once_budget_is_spent() {
        let p = relative(1.0);
        assert_eq!(p.tolerance_source(), ToleranceSource::Remaining);

        let mut b = p.leaf_budget(10);
        assert!(p.can_prune(&mut b, 3.0, 2.0, 5).unwrap());
        assert_eq!(b.remaining_epsilon(), 0.5);

        // max error 1.5; allowed = 2 * 0.5 * 5 / 5 = 1.0
        let before = b;
        assert!(!p.can_prune(&mut b, 5.0, 2.0, 5).unwrap());
        assert_eq!(b, before);
        assert!(b.remaining_epsilon() >= 0.0);
    }

    #[test]
    fn spent_budget_stops_pruning_without_violation() {
        let p = relative(0.5);
        let mut b = p.leaf_budget(2);
        // max error 1.0 < allowed 10 * 0.5 * 1 / 2 = 2.5
        assert!(p.can_prune(&mut b, 12.0, 10.0, 1).unwrap());
        assert_eq!(b.remaining_epsilon(), -0.5);

        let before = b;
        assert!(!p.can_prune(&mut b, 10.001, 10.0, 1).unwrap());
        assert_eq!(b, before);

        // The configured source keeps pruning on the same budget.
        let lax = p.with_tolerance_source(ToleranceSource::Configured);
        assert!(lax.can_prune(&mut b, 10.001, 10.0, 1).unwrap());
    }

    #[test]
    fn remaining_source_tightens_after_consumption() {
        let c = ErrorCriterion::relative(1.0).unwrap();
        let remaining = Pruner::new(c).with_verify(VerifyMode::Checked);
        let configured = remaining.with_tolerance_source(ToleranceSource::Configured);

        // First prune consumes 0.5 of epsilon in both modes.
        let mut b1 = configured.leaf_budget(10);
        let mut b2 = remaining.leaf_budget(10);
        assert!(configured.can_prune(&mut b1, 3.0, 2.0, 5).unwrap());
        assert!(remaining.can_prune(&mut b2, 3.0, 2.0, 5).unwrap());
        assert_eq!(b2.remaining_epsilon(), 0.5);

        // max error 1.5; allowed = 2 * eps * 5 / 5, i.e. 2.0 configured vs 1.0 remaining
        assert!(configured.can_prune(&mut b1, 5.0, 2.0, 5).unwrap());
        assert!(!remaining.can_prune(&mut b2, 5.0, 2.0, 5).unwrap());
    }

    #[test]
    fn recorded_updates_stats() {
        let p = relative(2.0);
        let stats = PruneStats::new();
        let mut b = p.leaf_budget(20);
        assert!(p.can_prune_recorded(&mut b, 10.0, 8.0, 5, &stats).unwrap());
        assert!(!p.can_prune_recorded(&mut b, 100.0, 1.0, 5, &stats).unwrap());
        assert!(p.can_prune_recorded(&mut b, 1.0, 2.0, 5, &stats).is_err());

        let s = stats.snapshot();
        assert_eq!(s.attempts, 3);
        assert_eq!(s.prunes, 1);
        assert_eq!(s.pruned_references, 5);
        assert_eq!(s.violations, 1);
        assert_eq!(s.consumed_error, 1.0);
    }

    #[test]
    fn deserialized_pruner_rejects_invalid_criterion() {
        let bad = r#"{"criterion":{"kind":"relative","epsilon":-1.0},"verify":"checked"}"#;
        assert!(serde_json::from_str::<Pruner>(bad).is_err());

        let good = r#"{"criterion":{"kind":"relative","epsilon":1.0},"verify":"checked"}"#;
        let p: Pruner = serde_json::from_str(good).unwrap();
        assert_eq!(p.verify(), VerifyMode::Checked);
        assert_eq!(p.tolerance_source(), ToleranceSource::Remaining);
    }

    #[test]
    fn verify_mode_parses() {
        assert_eq!("Checked".parse::<VerifyMode>().unwrap(), VerifyMode::Checked);
        assert_eq!("off".parse::<VerifyMode>().unwrap(), VerifyMode::Unchecked);
        assert!("sometimes".parse::<VerifyMode>().is_err());
        assert_eq!(
            "remaining".parse::<ToleranceSource>().unwrap(),
            ToleranceSource::Remaining
        );
        assert_eq!(
            "Configured".parse::<ToleranceSource>().unwrap(),
            ToleranceSource::Configured
        );
    }
}
