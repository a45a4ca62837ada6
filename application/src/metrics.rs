//! In-process counters for critique and revision activity.
//!
//! Shared across requests behind an `Arc`; every counter is an independent
//! atomic, so no lock is taken on the hot path.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct CritiqueMetrics {
    evaluations: AtomicU64,
    fallacies: AtomicU64,
    weak_citations: AtomicU64,
    bias_warnings: AtomicU64,
    malformed_citations: AtomicU64,
    degradations: AtomicU64,
    revision_attempts: AtomicU64,
    improved: AtomicU64,
    generation_failures: AtomicU64,
    cancellations: AtomicU64,
}

/// Point-in-time copy of [`CritiqueMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub evaluations: u64,
    pub fallacies: u64,
    pub weak_citations: u64,
    pub bias_warnings: u64,
    pub malformed_citations: u64,
    pub degradations: u64,
    pub revision_attempts: u64,
    pub improved: u64,
    pub generation_failures: u64,
    pub cancellations: u64,
}

impl CritiqueMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_evaluation(
        &self,
        fallacies: usize,
        weak_citations: usize,
        bias_warnings: usize,
        malformed_citations: usize,
    ) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        self.fallacies.fetch_add(fallacies as u64, Ordering::Relaxed);
        self.weak_citations
            .fetch_add(weak_citations as u64, Ordering::Relaxed);
        self.bias_warnings
            .fetch_add(bias_warnings as u64, Ordering::Relaxed);
        self.malformed_citations
            .fetch_add(malformed_citations as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_degradation(&self) {
        self.degradations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_attempt(&self, improved: bool) {
        self.revision_attempts.fetch_add(1, Ordering::Relaxed);
        if improved {
            self.improved.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_generation_failure(&self) {
        self.revision_attempts.fetch_add(1, Ordering::Relaxed);
        self.generation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            fallacies: self.fallacies.load(Ordering::Relaxed),
            weak_citations: self.weak_citations.load(Ordering::Relaxed),
            bias_warnings: self.bias_warnings.load(Ordering::Relaxed),
            malformed_citations: self.malformed_citations.load(Ordering::Relaxed),
            degradations: self.degradations.load(Ordering::Relaxed),
            revision_attempts: self.revision_attempts.load(Ordering::Relaxed),
            improved: self.improved.load(Ordering::Relaxed),
            generation_failures: self.generation_failures.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
        }
    }
}
