//! Statistics snapshot for the hot cache

use crate::context::types::TokenCount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Point-in-time view of both tiers
///
/// `oldest_access`/`newest_access` cover the regular tier only, since
/// ultra-hot recency is positional and carries no timestamps.
/// `total_tokens_cached` sums both tiers, so a conversation held in both is
/// counted twice, once per copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HotCacheStats {
    /// Number of entries in the regular tier
    pub regular_size: usize,

    /// Number of entries in the ultra-hot tier
    pub ultra_hot_size: usize,

    /// Earliest `last_access` in the regular tier
    pub oldest_access: Option<DateTime<Utc>>,

    /// Latest `last_access` in the regular tier
    pub newest_access: Option<DateTime<Utc>>,

    /// Sum of `total_tokens` across both tiers
    pub total_tokens_cached: TokenCount,

    #[serde(flatten)]
    pub counters: CacheCounters,
}

/// Running counters since construction or the last `clear`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CacheCounters {
    /// Hits served from the ultra-hot tier
    pub ultra_hot_hits: u64,

    /// Hits served from the regular tier
    pub regular_hits: u64,

    /// Lookups that found nothing valid
    pub misses: u64,

    /// Regular entries dropped because their TTL passed
    pub expirations: u64,

    /// Regular entries evicted to stay within `max_entries`
    pub evictions: u64,

    /// Ultra-hot entries evicted to make room for a promotion
    pub ultra_hot_evictions: u64,

    /// Copies made into the ultra-hot tier
    pub promotions: u64,
}

impl CacheCounters {
    pub fn hits(&self) -> u64 {
        self.ultra_hot_hits + self.regular_hits
    }

    /// Calculate cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits() as f64 / total as f64) * 100.0
        }
    }
}

impl HotCacheStats {
    pub fn hit_rate(&self) -> f64 {
        self.counters.hit_rate()
    }
}

impl fmt::Display for HotCacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HotCacheStats {{ regular: {}, ultra_hot: {}, tokens: {}, hits: {}, misses: {}, hit_rate: {:.2}%, promotions: {} }}",
            self.regular_size,
            self.ultra_hot_size,
            self.total_tokens_cached,
            self.counters.hits(),
            self.counters.misses,
            self.hit_rate(),
            self.counters.promotions
        )
    }
}
