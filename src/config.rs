//! Configuration Module
//!
//! Handles loading and managing generator configuration from environment variables.

use std::env;

/// Generator configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Maximum number of artifacts the cache can hold
    pub cache_max_entries: usize,
    /// Default TTL in seconds for cached artifacts without explicit TTL
    pub cache_default_ttl_secs: u64,
    /// Approximate memory ceiling for cached artifacts, in bytes
    pub cache_max_memory_bytes: usize,
    /// Ring buffer capacity of the performance recorder
    pub metrics_capacity: usize,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval_secs: u64,
}

impl GeneratorConfig {
    /// Creates a new GeneratorConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `QRGEN_MAX_ENTRIES` - Maximum cached artifacts (default: 100)
    /// - `QRGEN_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `QRGEN_MAX_MEMORY_BYTES` - Cache memory ceiling in bytes (default: 32 MiB)
    /// - `QRGEN_METRICS_CAPACITY` - Performance sample buffer size (default: 100)
    /// - `QRGEN_CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 30)
    pub fn from_env() -> Self {
        Self {
            cache_max_entries: env::var("QRGEN_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            cache_default_ttl_secs: env::var("QRGEN_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            cache_max_memory_bytes: env::var("QRGEN_MAX_MEMORY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(32 * 1024 * 1024),
            metrics_capacity: env::var("QRGEN_METRICS_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            cleanup_interval_secs: env::var("QRGEN_CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            cache_max_entries: 100,
            cache_default_ttl_secs: 300,
            cache_max_memory_bytes: 32 * 1024 * 1024,
            metrics_capacity: 100,
            cleanup_interval_secs: 30,
        }
    }
}
