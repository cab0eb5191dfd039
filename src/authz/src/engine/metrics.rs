//! Evaluation counters

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::Decision;

/// Point-in-time copy of the evaluator counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluatorMetrics {
    /// Total number of evaluations
    pub evaluations: u64,

    /// Evaluations that ended `Allowed`
    pub allowed: u64,

    /// Evaluations that ended `Rejected`
    pub rejected: u64,

    /// Evaluations that ended `Unknown`
    pub unknown: u64,

    /// Evaluations aborted by a configuration error
    pub errors: u64,

    /// Rejections that skipped at least one remaining constraint
    pub short_circuits: u64,
}

impl EvaluatorMetrics {
    /// Share of decided evaluations that were allowed
    pub fn allow_rate(&self) -> f64 {
        let total = self.allowed + self.rejected;
        if total == 0 {
            0.0
        } else {
            self.allowed as f64 / total as f64
        }
    }
}

/// Lock-free metrics collector shared by all evaluation calls
#[derive(Debug, Default)]
pub struct MetricsCollector {
    evaluations: AtomicU64,
    allowed: AtomicU64,
    rejected: AtomicU64,
    unknown: AtomicU64,
    errors: AtomicU64,
    short_circuits: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed evaluation
    pub fn record_decision(&self, decision: Decision) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let counter = match decision {
            Decision::Allowed => &self.allowed,
            Decision::Rejected => &self.rejected,
            Decision::Unknown => &self.unknown,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an evaluation aborted by an error
    pub fn record_error(&self) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejection that skipped remaining constraints
    pub fn record_short_circuit(&self) {
        self.short_circuits.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics
    pub fn snapshot(&self) -> EvaluatorMetrics {
        EvaluatorMetrics {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            allowed: self.allowed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            unknown: self.unknown.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            short_circuits: self.short_circuits.load(Ordering::Relaxed),
        }
    }
}
