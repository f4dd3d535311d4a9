//! Cache Store Module
//!
//! Main artifact cache combining HashMap storage with LRU tracking, TTL
//! expiration and a memory-pressure safety valve.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{CacheEntry, CacheKey, CacheStats, LruTracker};
use crate::config::GeneratorConfig;
use crate::error::{GenerateError, Result};
use crate::models::Artifact;

// == Artifact Cache ==
/// Bounded artifact store with TTL expiry, LRU eviction and an
/// approximate-memory eviction safety valve.
#[derive(Debug)]
pub struct ArtifactCache {
    /// Key to entry storage
    entries: HashMap<CacheKey, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Default TTL for entries without explicit TTL
    default_ttl: Duration,
    /// Approximate memory ceiling in bytes
    max_memory_bytes: usize,
    /// Approximate bytes currently held
    memory_bytes: usize,
}

impl ArtifactCache {
    // == Constructor ==
    /// Creates a new ArtifactCache.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of artifacts the cache can hold
    /// * `default_ttl` - TTL applied to entries inserted without one
    /// * `max_memory_bytes` - Approximate memory ceiling
    pub fn new(max_entries: usize, default_ttl: Duration, max_memory_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
            max_memory_bytes,
            memory_bytes: 0,
        }
    }

    /// Creates a new ArtifactCache from generator configuration.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(
            config.cache_max_entries,
            Duration::from_secs(config.cache_default_ttl_secs),
            config.cache_max_memory_bytes,
        )
    }

    // == Get ==
    /// Retrieves an artifact by key.
    ///
    /// Returns None if the key is unknown or the entry's age exceeds its
    /// TTL. Expired entries are purged on read and counted both as a miss
    /// and as an eviction.
    pub fn get(&mut self, key: &CacheKey) -> Option<Artifact> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_eviction();
            self.stats.record_miss();
            return None;
        }

        let artifact = self.entries.get_mut(key).map(|entry| {
            entry.touch();
            entry.artifact.clone()
        });
        if artifact.is_some() {
            self.stats.record_hit();
            self.lru.touch(key);
        }
        artifact
    }

    // == Set ==
    /// Stores an artifact under a key with optional TTL.
    ///
    /// If the key already exists, the artifact is overwritten and TTL is
    /// reset. Eviction (expiry sweep, LRU capacity, memory ceiling) runs
    /// before the insertion completes.
    pub fn set(&mut self, key: CacheKey, artifact: Artifact, ttl: Option<Duration>) -> Result<()> {
        let size = artifact.approx_size_bytes();
        if size > self.max_memory_bytes {
            return Err(GenerateError::Cache(format!(
                "Artifact of {} bytes exceeds the cache memory ceiling of {} bytes",
                size, self.max_memory_bytes
            )));
        }

        self.evict_if_needed(&key, size);

        // Replacing an entry gives back its bytes first
        if self.entries.contains_key(&key) {
            self.remove_entry(&key);
        }

        let entry = CacheEntry::new(artifact, Some(ttl.unwrap_or(self.default_ttl)));
        self.memory_bytes += entry.size_bytes;
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);

        self.stats.set_total_entries(self.entries.len());
        self.stats.set_approx_memory_bytes(self.memory_bytes);
        Ok(())
    }

    // == Has ==
    /// Checks whether a live entry exists for the key.
    ///
    /// Same expiry semantics as `get` (an expired entry is purged and
    /// counted as an eviction), but a peek: no hit/miss accounting and no
    /// recency touch.
    pub fn has(&mut self, key: &CacheKey) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };
        if expired {
            self.remove_entry(key);
            self.stats.record_eviction();
            return false;
        }
        true
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether an entry was removed.
    pub fn delete(&mut self, key: &CacheKey) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Clear ==
    /// Removes all entries. Hit/miss/eviction counters are retained.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru = LruTracker::new();
        self.memory_bytes = 0;
        self.stats.set_total_entries(0);
        self.stats.set_approx_memory_bytes(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats.set_approx_memory_bytes(self.memory_bytes);
        stats.max_entries = self.max_entries;
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed; each removal counts as an
    /// eviction.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        for key in expired_keys {
            self.remove_entry(&key);
            self.stats.record_eviction();
        }
        count
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Eviction ==
    /// Runs the three eviction passes ahead of inserting `incoming_bytes`
    /// under `key`.
    ///
    /// 1. Expiry sweep.
    /// 2. Capacity: evict least-recently-used entries while the store is
    ///    at capacity (overwrites do not grow the store and skip this).
    /// 3. Memory ceiling: evict by size descending, recency ascending
    ///    until the incoming artifact fits under the ceiling.
    ///
    /// Every pass is a no-op on an empty store.
    fn evict_if_needed(&mut self, key: &CacheKey, incoming_bytes: usize) {
        self.cleanup_expired();

        let is_overwrite = self.entries.contains_key(key);
        if !is_overwrite {
            while self.entries.len() >= self.max_entries {
                match self.lru.evict_oldest() {
                    Some(victim) => {
                        if let Some(entry) = self.entries.remove(&victim) {
                            self.memory_bytes -= entry.size_bytes;
                        }
                        self.stats.record_eviction();
                    }
                    None => break,
                }
            }
        }

        // The overwritten entry's bytes are released before insertion
        let replaced_bytes = if is_overwrite {
            self.entries
                .get(key)
                .map(|entry| entry.size_bytes)
                .unwrap_or(0)
        } else {
            0
        };
        let mut occupied = self.memory_bytes - replaced_bytes;

        while occupied + incoming_bytes > self.max_memory_bytes {
            // Prefer evicting large, stale entries
            let victim = self
                .entries
                .iter()
                .filter(|(candidate, _)| *candidate != key)
                .max_by_key(|(_, entry)| (entry.size_bytes, Reverse(entry.last_access)))
                .map(|(candidate, _)| candidate.clone());

            match victim {
                Some(victim) => {
                    if let Some(entry) = self.remove_entry(&victim) {
                        occupied -= entry.size_bytes;
                    }
                    self.stats.record_eviction();
                }
                None => break,
            }
        }

        self.stats.set_total_entries(self.entries.len());
        self.stats.set_approx_memory_bytes(self.memory_bytes);
    }

    /// Removes an entry and reconciles the tracker and memory gauge.
    fn remove_entry(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        self.memory_bytes -= entry.size_bytes;
        self.stats.set_total_entries(self.entries.len());
        self.stats.set_approx_memory_bytes(self.memory_bytes);
        Some(entry)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::canonicalize;
    use crate::models::{Artifact, ArtifactPayload, GenerationOptions};
    use std::thread::sleep;

    const TEST_MEMORY_CEILING: usize = 1024 * 1024;

    fn test_cache(max_entries: usize) -> ArtifactCache {
        ArtifactCache::new(max_entries, Duration::from_secs(300), TEST_MEMORY_CEILING)
    }

    fn key(payload: &str) -> CacheKey {
        canonicalize(payload, &GenerationOptions::default()).unwrap()
    }

    /// Builds a vector artifact whose approximate size is exactly `bytes`.
    fn artifact_of_size(bytes: usize) -> Artifact {
        Artifact::new(
            ArtifactPayload::Vector("x".repeat(bytes)),
            100,
            100,
            GenerationOptions::default(),
        )
    }

    #[test]
    fn test_store_new() {
        let store = test_cache(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = test_cache(100);
        let k = key("k1");

        store.set(k.clone(), artifact_of_size(16), None).unwrap();
        let artifact = store.get(&k).unwrap();

        assert_eq!(artifact.approx_size_bytes(), 16);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = test_cache(100);
        assert!(store.get(&key("missing")).is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_has_does_not_count_requests() {
        let mut store = test_cache(100);
        let k = key("k1");
        store.set(k.clone(), artifact_of_size(8), None).unwrap();

        assert!(store.has(&k));
        assert!(!store.has(&key("missing")));

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_store_delete() {
        let mut store = test_cache(100);
        let k = key("k1");

        store.set(k.clone(), artifact_of_size(8), None).unwrap();
        assert!(store.delete(&k));
        assert!(store.is_empty());
        assert!(!store.delete(&k));
    }

    #[test]
    fn test_store_clear() {
        let mut store = test_cache(100);
        store.set(key("k1"), artifact_of_size(8), None).unwrap();
        store.set(key("k2"), artifact_of_size(8), None).unwrap();

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.stats().approx_memory_bytes, 0);
    }

    #[test]
    fn test_store_overwrite_reconciles_memory() {
        let mut store = test_cache(100);
        let k = key("k1");

        store.set(k.clone(), artifact_of_size(100), None).unwrap();
        store.set(k.clone(), artifact_of_size(40), None).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().approx_memory_bytes, 40);
        assert_eq!(store.get(&k).unwrap().approx_size_bytes(), 40);
    }

    #[test]
    fn test_store_ttl_expiration_on_get() {
        let mut store = test_cache(100);
        let k = key("k1");

        store
            .set(k.clone(), artifact_of_size(8), Some(Duration::from_millis(50)))
            .unwrap();
        assert!(store.get(&k).is_some());

        sleep(Duration::from_millis(80));

        assert!(store.get(&k).is_none());
        let stats = store.stats();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_store_ttl_expiration_on_has() {
        let mut store = test_cache(100);
        let k = key("k1");

        store
            .set(k.clone(), artifact_of_size(8), Some(Duration::from_millis(50)))
            .unwrap();
        assert!(store.has(&k));

        sleep(Duration::from_millis(80));

        assert!(!store.has(&k));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = test_cache(3);
        let (k1, k2, k3, k4) = (key("k1"), key("k2"), key("k3"), key("k4"));

        store.set(k1.clone(), artifact_of_size(8), None).unwrap();
        store.set(k2.clone(), artifact_of_size(8), None).unwrap();
        store.set(k3.clone(), artifact_of_size(8), None).unwrap();

        // Cache is full, adding k4 should evict k1 (oldest)
        store.set(k4.clone(), artifact_of_size(8), None).unwrap();

        assert_eq!(store.len(), 3);
        assert!(!store.has(&k1));
        assert!(store.has(&k2));
        assert!(store.has(&k3));
        assert!(store.has(&k4));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = test_cache(3);
        let (k1, k2, k3, k4) = (key("k1"), key("k2"), key("k3"), key("k4"));

        store.set(k1.clone(), artifact_of_size(8), None).unwrap();
        store.set(k2.clone(), artifact_of_size(8), None).unwrap();
        store.set(k3.clone(), artifact_of_size(8), None).unwrap();

        // Access k1 to make it most recently used
        store.get(&k1).unwrap();

        // Adding k4 should evict k2 (now oldest)
        store.set(k4.clone(), artifact_of_size(8), None).unwrap();

        assert!(store.has(&k1));
        assert!(!store.has(&k2));
    }

    #[test]
    fn test_store_memory_ceiling_eviction() {
        let mut store = ArtifactCache::new(100, Duration::from_secs(300), 1000);
        let (k1, k2, k3) = (key("k1"), key("k2"), key("k3"));

        store.set(k1.clone(), artifact_of_size(600), None).unwrap();
        store.set(k2.clone(), artifact_of_size(300), None).unwrap();

        // 600 + 300 + 300 > 1000: the largest entry (k1) is evicted first
        store.set(k3.clone(), artifact_of_size(300), None).unwrap();

        assert!(!store.has(&k1));
        assert!(store.has(&k2));
        assert!(store.has(&k3));
        assert!(store.stats().approx_memory_bytes <= 1000);
    }

    #[test]
    fn test_store_memory_eviction_prefers_stale_on_size_tie() {
        let mut store = ArtifactCache::new(100, Duration::from_secs(300), 1000);
        let (k1, k2, k3) = (key("k1"), key("k2"), key("k3"));

        store.set(k1.clone(), artifact_of_size(400), None).unwrap();
        sleep(Duration::from_millis(5));
        store.set(k2.clone(), artifact_of_size(400), None).unwrap();
        sleep(Duration::from_millis(5));

        // Same size: the staler of k1/k2 goes first
        store.set(k3.clone(), artifact_of_size(400), None).unwrap();

        assert!(!store.has(&k1));
        assert!(store.has(&k2));
        assert!(store.has(&k3));
    }

    #[test]
    fn test_store_rejects_artifact_over_ceiling() {
        let mut store = ArtifactCache::new(100, Duration::from_secs(300), 100);
        let result = store.set(key("k1"), artifact_of_size(200), None);

        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_zero_ceiling_rejects_gracefully() {
        let mut store = ArtifactCache::new(0, Duration::from_secs(300), 0);
        // Ceiling of zero: insertion is refused, nothing panics
        let result = store.set(key("k1"), artifact_of_size(8), None);
        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_eviction_with_room_is_noop() {
        let mut store = test_cache(100);
        store.set(key("k1"), artifact_of_size(8), None).unwrap();
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_stats() {
        let mut store = test_cache(100);
        let k = key("k1");

        store.set(k.clone(), artifact_of_size(8), None).unwrap();
        store.get(&k).unwrap(); // hit
        let _ = store.get(&key("missing")); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.max_entries, 100);
        assert_eq!(stats.approx_memory_bytes, 8);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = test_cache(100);
        let (k1, k2) = (key("k1"), key("k2"));

        store
            .set(k1, artifact_of_size(8), Some(Duration::from_millis(30)))
            .unwrap();
        store
            .set(k2.clone(), artifact_of_size(8), Some(Duration::from_secs(10)))
            .unwrap();

        sleep(Duration::from_millis(60));

        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.has(&k2));
    }
}
