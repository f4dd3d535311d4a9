//! Performance Metrics Module
//!
//! Records duration, cache-hit and size samples per operation in a
//! bounded ring buffer.

use std::collections::VecDeque;
use std::time::Instant;

use serde::Serialize;

use crate::cache::current_timestamp_ms;

/// Default number of samples retained.
pub const DEFAULT_METRICS_CAPACITY: usize = 100;

// == Performance Metric ==
/// One observed pipeline operation.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetric {
    /// Operation name
    pub operation: String,
    /// Wall-clock duration in milliseconds
    pub duration_ms: f64,
    /// Completion timestamp (Unix milliseconds)
    pub timestamp_ms: u64,
    /// Whether the artifact was served from the cache
    pub cache_hit: bool,
    /// Whether the operation completed successfully
    pub success: bool,
    /// Approximate artifact size in bytes (0 on failure)
    pub artifact_bytes: usize,
}

// == Operation Timer ==
/// Measures one operation from start to finish.
#[derive(Debug)]
pub struct OperationTimer {
    operation: String,
    started: Instant,
}

impl OperationTimer {
    /// Starts timing an operation.
    pub fn start(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            started: Instant::now(),
        }
    }

    /// Finishes the operation into a metric sample.
    pub fn finish(self, cache_hit: bool, success: bool, artifact_bytes: usize) -> PerformanceMetric {
        PerformanceMetric {
            operation: self.operation,
            duration_ms: self.started.elapsed().as_secs_f64() * 1000.0,
            timestamp_ms: current_timestamp_ms(),
            cache_hit,
            success,
            artifact_bytes,
        }
    }
}

// == Performance Recorder ==
/// Bounded ring buffer of performance samples.
///
/// Derived views (`average_duration_ms`, `cache_hit_rate`) are computed
/// on demand; the buffer is small and bounded, so nothing is
/// materialized incrementally.
#[derive(Debug)]
pub struct PerformanceRecorder {
    samples: VecDeque<PerformanceMetric>,
    capacity: usize,
}

impl Default for PerformanceRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_METRICS_CAPACITY)
    }
}

impl PerformanceRecorder {
    // == Constructor ==
    /// Creates a recorder retaining up to `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    // == Record ==
    /// Appends a sample, dropping the oldest once the bound is exceeded.
    pub fn record(&mut self, metric: PerformanceMetric) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(metric);
    }

    // == Snapshot ==
    /// Returns a snapshot copy of the retained samples, oldest first.
    pub fn metrics(&self) -> Vec<PerformanceMetric> {
        self.samples.iter().cloned().collect()
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drops all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    // == Derived Views ==
    /// Average duration over retained samples, optionally filtered by
    /// operation name. Returns 0.0 with no matching samples.
    pub fn average_duration_ms(&self, operation: Option<&str>) -> f64 {
        let durations: Vec<f64> = self
            .samples
            .iter()
            .filter(|m| operation.map_or(true, |name| m.operation == name))
            .map(|m| m.duration_ms)
            .collect();
        if durations.is_empty() {
            0.0
        } else {
            durations.iter().sum::<f64>() / durations.len() as f64
        }
    }

    /// Fraction of retained samples served from the cache. Returns 0.0
    /// with no samples.
    pub fn cache_hit_rate(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let hits = self.samples.iter().filter(|m| m.cache_hit).count();
        hits as f64 / self.samples.len() as f64
    }
}
