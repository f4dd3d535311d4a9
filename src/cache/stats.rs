//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! approximate memory use.

use serde::Serialize;

// == Cache Stats ==
/// Tracks artifact cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key unknown or expired)
    pub misses: u64,
    /// Number of entries removed by TTL, capacity or memory pressure
    pub evictions: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Configured entry capacity
    pub max_entries: usize,
    /// Approximate bytes held by cached artifacts
    pub approx_memory_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Update Gauges ==
    /// Updates the entry count gauge.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }

    /// Updates the approximate memory gauge.
    pub fn set_approx_memory_bytes(&mut self, bytes: usize) {
        self.approx_memory_bytes = bytes;
    }
}
