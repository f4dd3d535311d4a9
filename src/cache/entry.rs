//! Cache Entry Module
//!
//! Defines the structure for individual cached artifacts with TTL support.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::models::Artifact;

// == Cache Entry ==
/// A cached artifact with access bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored artifact
    pub artifact: Artifact,
    /// Insertion timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Last access timestamp (Unix milliseconds)
    pub last_access: u64,
    /// Number of cache hits served from this entry
    pub access_count: u64,
    /// Approximate artifact size in bytes
    pub size_bytes: usize,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    pub fn new(artifact: Artifact, ttl: Option<Duration>) -> Self {
        let now = current_timestamp_ms();
        let size_bytes = artifact.approx_size_bytes();
        let expires_at = ttl.map(|ttl| now + ttl.as_millis() as u64);

        Self {
            artifact,
            created_at: now,
            last_access: now,
            access_count: 0,
            size_bytes,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to the expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    // == Touch ==
    /// Records a cache hit: bumps the access count and timestamp.
    pub fn touch(&mut self) {
        self.access_count += 1;
        self.last_access = current_timestamp_ms();
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at.map(|expires| {
            let now = current_timestamp_ms();
            expires.saturating_sub(now)
        })
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtifactPayload, GenerationOptions};
    use std::thread::sleep;

    fn test_artifact() -> Artifact {
        Artifact::new(
            ArtifactPayload::Vector("<svg/>".to_string()),
            100,
            100,
            GenerationOptions::default(),
        )
    }

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = CacheEntry::new(test_artifact(), None);

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
        assert_eq!(entry.access_count, 0);
        assert_eq!(entry.created_at, entry.last_access);
        assert_eq!(entry.size_bytes, "<svg/>".len());
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new(test_artifact(), Some(Duration::from_secs(60)));

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(test_artifact(), Some(Duration::from_millis(50)));

        assert!(!entry.is_expired());
        sleep(Duration::from_millis(80));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_entry_touch_updates_bookkeeping() {
        let mut entry = CacheEntry::new(test_artifact(), None);
        let created = entry.last_access;

        sleep(Duration::from_millis(5));
        entry.touch();

        assert_eq!(entry.access_count, 1);
        assert!(entry.last_access >= created);
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::new(test_artifact(), Some(Duration::from_secs(10)));

        let remaining = entry.ttl_remaining_ms().unwrap();
        assert!(remaining <= 10_000);
        assert!(remaining >= 9_000);
    }

    #[test]
    fn test_ttl_remaining_expired_is_zero() {
        let entry = CacheEntry::new(test_artifact(), Some(Duration::from_millis(20)));

        sleep(Duration::from_millis(50));
        assert_eq!(entry.ttl_remaining_ms().unwrap(), 0);
    }

    #[test]
    fn test_ttl_remaining_no_expiration() {
        let entry = CacheEntry::new(test_artifact(), None);
        assert!(entry.ttl_remaining_ms().is_none());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = current_timestamp_ms();
        let mut entry = CacheEntry::new(test_artifact(), None);
        entry.expires_at = Some(now);

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }
}
