// Live statistics aggregation — cache hit/miss counts and fetch outcomes.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub legacy_hits: u64,
    pub misses: u64,
    pub nulls: u64,
    pub committed: u64,
    pub fetch_failures: u64,
    pub stale_drops: u64,
}

pub struct StatsCollector {
    hits: AtomicU64,
    legacy_hits: AtomicU64,
    misses: AtomicU64,
    nulls: AtomicU64,
    committed: AtomicU64,
    fetch_failures: AtomicU64,
    stale_drops: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            legacy_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            nulls: AtomicU64::new(0),
            committed: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            stale_drops: AtomicU64::new(0),
        }
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_legacy_hit(&self) {
        self.legacy_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_null(&self) {
        self.nulls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_committed(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale_drop(&self) {
        self.stale_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            legacy_hits: self.legacy_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            nulls: self.nulls.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            stale_drops: self.stale_drops.load(Ordering::Relaxed),
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}
