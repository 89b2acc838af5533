use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stored in a timestamp slot that was never written.
const NEVER: u64 = 0;

/// Lock-free success/failure counter with the time of the latest outcome.
#[derive(Debug, Default)]
pub struct AtomicMetric {
    successes: AtomicU64,
    failures: AtomicU64,
    last_success_ms: AtomicU64,
    last_failure_ms: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AtomicSnapshot {
    pub successes: u64,
    pub failures: u64,
    pub last_success_ms: Option<u64>,
    pub last_failure_ms: Option<u64>,
}

impl AtomicSnapshot {
    pub fn attempts(&self) -> u64 {
        self.successes + self.failures
    }
}

impl AtomicMetric {
    pub fn record_success(&self) {
        record(&self.successes, &self.last_success_ms);
    }

    pub fn record_failure(&self) {
        record(&self.failures, &self.last_failure_ms);
    }

    pub fn snapshot(&self) -> AtomicSnapshot {
        AtomicSnapshot {
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            last_success_ms: read_stamp(&self.last_success_ms),
            last_failure_ms: read_stamp(&self.last_failure_ms),
        }
    }

    pub fn reset(&self) {
        for slot in [
            &self.successes,
            &self.failures,
            &self.last_success_ms,
            &self.last_failure_ms,
        ] {
            slot.store(NEVER, Ordering::Relaxed);
        }
    }
}

fn record(counter: &AtomicU64, stamp: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(NEVER);
    stamp.store(now, Ordering::Relaxed);
}

fn read_stamp(stamp: &AtomicU64) -> Option<u64> {
    match stamp.load(Ordering::Relaxed) {
        NEVER => None,
        value => Some(value),
    }
}

/// Outcome counters for every remote write and hydration read.
#[derive(Debug, Default)]
pub struct SyncMetrics {
    pub vote_commits: AtomicMetric,
    pub membership_commits: AtomicMetric,
    pub post_deletes: AtomicMetric,
    pub hydrations: AtomicMetric,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncMetricsSnapshot {
    pub vote_commits: AtomicSnapshot,
    pub membership_commits: AtomicSnapshot,
    pub post_deletes: AtomicSnapshot,
    pub hydrations: AtomicSnapshot,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        SyncMetricsSnapshot {
            vote_commits: self.vote_commits.snapshot(),
            membership_commits: self.membership_commits.snapshot(),
            post_deletes: self.post_deletes.snapshot(),
            hydrations: self.hydrations.snapshot(),
        }
    }

    pub fn reset(&self) {
        self.vote_commits.reset();
        self.membership_commits.reset();
        self.post_deletes.reset();
        self.hydrations.reset();
    }
}
