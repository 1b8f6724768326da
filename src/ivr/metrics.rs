//! Flow start batch metrics
//!
//! Counters are shared between worker units; a snapshot gives a consistent
//! enough view for logging and tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Batch execution counters
#[derive(Debug, Default)]
pub struct BatchMetrics {
    /// Batches that completed without a fatal error
    pub batches_completed: AtomicU64,
    /// Batches aborted by a fatal error
    pub batches_failed: AtomicU64,
    /// Batches aborted because they exceeded the batch timeout
    pub batches_timed_out: AtomicU64,
    /// Candidate contacts seen across all batches
    pub contacts_considered: AtomicU64,
    /// Candidates dropped by the participation checks
    pub contacts_excluded: AtomicU64,
    /// Call starts that were requested successfully
    pub calls_requested: AtomicU64,
    /// Call starts that failed and were skipped
    pub call_failures: AtomicU64,
}

impl BatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_exclusions(&self, considered: usize, excluded: usize) {
        self.contacts_considered
            .fetch_add(considered as u64, Ordering::Relaxed);
        self.contacts_excluded
            .fetch_add(excluded as u64, Ordering::Relaxed);
    }

    pub fn record_call_requested(&self) {
        self.calls_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_call_failed(&self) {
        self.call_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch_completed(&self) {
        self.batches_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch_failed(&self, timed_out: bool) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        if timed_out {
            self.batches_timed_out.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            batches_completed: self.batches_completed.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            batches_timed_out: self.batches_timed_out.load(Ordering::Relaxed),
            contacts_considered: self.contacts_considered.load(Ordering::Relaxed),
            contacts_excluded: self.contacts_excluded.load(Ordering::Relaxed),
            calls_requested: self.calls_requested.load(Ordering::Relaxed),
            call_failures: self.call_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub batches_completed: u64,
    pub batches_failed: u64,
    pub batches_timed_out: u64,
    pub contacts_considered: u64,
    pub contacts_excluded: u64,
    pub calls_requested: u64,
    pub call_failures: u64,
}

impl MetricsSnapshot {
    /// Fraction of requested calls that failed (0.0 to 1.0)
    pub fn call_failure_rate(&self) -> f64 {
        let attempts = self.calls_requested + self.call_failures;
        if attempts == 0 {
            0.0
        } else {
            self.call_failures as f64 / attempts as f64
        }
    }
}
