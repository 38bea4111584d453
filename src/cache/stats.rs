//! Cache Statistics Module
//!
//! Tracks how the two tiers served requests: local hits and misses, remote
//! failures, rollbacks and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Gets answered by the local tier
    pub local_hits: u64,
    /// Gets that fell through to the remote tier
    pub local_misses: u64,
    /// Remote values written into the local tier after a miss
    pub populations: u64,
    /// Remote calls that returned an error
    pub remote_errors: u64,
    /// Local entries restored or dropped after a failed remote write
    pub rollbacks: u64,
    /// Entries pushed out of the local tier by capacity pressure
    pub evictions: u64,
    /// Current number of entries in the local tier
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the local hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no gets have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.local_hits + self.local_misses;
        if total == 0 {
            0.0
        } else {
            self.local_hits as f64 / total as f64
        }
    }
}

// == Stats Recorder ==
/// Shared counters updated by the cached store.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    local_hits: AtomicU64,
    local_misses: AtomicU64,
    populations: AtomicU64,
    remote_errors: AtomicU64,
    rollbacks: AtomicU64,
    evictions: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.local_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.local_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_population(&self) {
        self.populations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_error(&self) {
        self.remote_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rollback(&self) {
        self.rollbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Copies the counters; `total_entries` is supplied by the caller.
    pub fn snapshot(&self, total_entries: usize) -> CacheStats {
        CacheStats {
            local_hits: self.local_hits.load(Ordering::Relaxed),
            local_misses: self.local_misses.load(Ordering::Relaxed),
            populations: self.populations.load(Ordering::Relaxed),
            remote_errors: self.remote_errors.load(Ordering::Relaxed),
            rollbacks: self.rollbacks.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StatsRecorder::new().snapshot(0);
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let recorder = StatsRecorder::new();
        recorder.record_hit();
        recorder.record_hit();
        recorder.record_hit();
        recorder.record_miss();
        assert_eq!(recorder.snapshot(0).hit_rate(), 0.75);
    }

    #[test]
    fn test_failure_counters() {
        let recorder = StatsRecorder::new();
        recorder.record_remote_error();
        recorder.record_remote_error();
        recorder.record_rollback();
        recorder.record_eviction();

        let stats = recorder.snapshot(7);
        assert_eq!(stats.remote_errors, 2);
        assert_eq!(stats.rollbacks, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.total_entries, 7);
    }
}
