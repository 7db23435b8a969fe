//! Lightweight prune counters.
//!
//! Shared by reference across a (possibly parallel) traversal. All updates are
//! relaxed atomics; a snapshot is advisory, not a synchronization point.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct PruneStats {
    attempts: AtomicU64,
    prunes: AtomicU64,
    pruned_references: AtomicU64,
    violations: AtomicU64,
    // f64 stored as bits; updated with a CAS loop.
    consumed_error_bits: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PruneStatsSnapshot {
    pub attempts: u64,
    pub prunes: u64,
    pub pruned_references: u64,
    pub violations: u64,
    pub consumed_error: f64,
}

impl PruneStatsSnapshot {
    /// Fraction of decisions that pruned (0 when nothing was attempted).
    pub fn prune_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.prunes as f64 / self.attempts as f64
        }
    }
}

impl PruneStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_prune(&self, reference_count: u64, max_error_incurred: f64) {
        self.prunes.fetch_add(1, Ordering::Relaxed);
        self.pruned_references
            .fetch_add(reference_count, Ordering::Relaxed);

        let mut cur = self.consumed_error_bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(cur) + max_error_incurred).to_bits();
            match self.consumed_error_bits.compare_exchange_weak(
                cur,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => cur = observed,
            }
        }
    }

    pub fn record_violation(&self) {
        self.violations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PruneStatsSnapshot {
        PruneStatsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            prunes: self.prunes.load(Ordering::Relaxed),
            pruned_references: self.pruned_references.load(Ordering::Relaxed),
            violations: self.violations.load(Ordering::Relaxed),
            consumed_error: f64::from_bits(self.consumed_error_bits.load(Ordering::Relaxed)),
        }
    }
}
