//! Regular-tier cache entries with TTL bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A value held in the regular tier, with expiry and access metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached value
    pub value: T,

    /// When the entry stops being served
    pub expires_at: DateTime<Utc>,

    /// Number of times this entry has been written or read since the last `set`
    pub access_count: u64,

    /// Last access time (for LRU eviction)
    pub last_access: DateTime<Utc>,

    /// Orders entries whose `last_access` is equal
    #[serde(skip)]
    pub(crate) sequence: u64,
}

impl<T> CacheEntry<T> {
    /// Create a freshly written entry, counted as one access
    pub fn new(value: T, now: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::seconds(900));

        Self {
            value,
            expires_at: now + ttl,
            access_count: 1,
            last_access: now,
            sequence: 0,
        }
    }

    /// Still valid at `now` (inclusive of the expiry instant)
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Get time until expiration
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.is_expired(now) {
            None
        } else {
            (self.expires_at - now).to_std().ok()
        }
    }

    /// Mark the entry as accessed (updates access time and count)
    pub fn mark_accessed(&mut self, now: DateTime<Utc>) {
        self.last_access = now;
        self.access_count += 1;
    }

    /// Check if the entry has been read often enough to be promoted
    pub fn is_hot(&self, threshold: u64) -> bool {
        self.access_count >= threshold
    }

    /// Whether `self` is older than `other` in LRU order
    pub(crate) fn accessed_before(&self, other: &CacheEntry<T>) -> bool {
        (self.last_access, self.sequence) < (other.last_access, other.sequence)
    }
}
