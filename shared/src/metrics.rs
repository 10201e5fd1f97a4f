use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct LookupMetrics {
    pub started: AtomicU64,
    /// RequestLocate calls dropped because a lookup was already in flight.
    pub deduplicated: AtomicU64,
    pub succeeded: AtomicU64,
    pub without_fix: AtomicU64,
    pub failed: AtomicU64,
    pub spinner_shown: AtomicU64,
    pub cancelled: AtomicU64,
}

impl LookupMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LookupMetricsSnapshot {
        LookupMetricsSnapshot {
            started: self.started.load(Ordering::Relaxed),
            deduplicated: self.deduplicated.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            without_fix: self.without_fix.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            spinner_shown: self.spinner_shown.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupMetricsSnapshot {
    pub started: u64,
    pub deduplicated: u64,
    pub succeeded: u64,
    pub without_fix: u64,
    pub failed: u64,
    pub spinner_shown: u64,
    pub cancelled: u64,
}

impl LookupMetricsSnapshot {
    /// Lookups that reached an outcome (fix, no fix, error) or were cancelled.
    pub fn finished(&self) -> u64 {
        self.succeeded + self.without_fix + self.failed + self.cancelled
    }
}
