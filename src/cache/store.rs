//! Two-tier hot cache with TTL expiry, LRU eviction and frequency promotion

use crate::cache::{
    clock::{Clock, SystemClock},
    config::HotCacheConfig,
    entry::CacheEntry,
    lru::UltraHotTier,
    types::{CacheCounters, HotCacheStats},
};
use crate::context::{ContextState, SessionId, TokenCount};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// In-memory store of conversation state keyed by session id
///
/// Two tiers:
/// - Regular: up to `max_entries` states, each valid for `ttl` after its
///   last `set`, evicting the least recently accessed entry when a new key
///   arrives at capacity.
/// - Ultra-hot: up to `ultra_hot_capacity` copies of entries read at least
///   `promotion_threshold` times. No expiry; LRU eviction only.
///
/// Every operation is synchronous and takes one lock covering both tiers,
/// which the background sweep shares.
pub struct HotCache {
    config: HotCacheConfig,
    clock: Arc<dyn Clock>,
    tiers: Arc<Mutex<Tiers>>,
    cleanup_task: Mutex<Option<JoinHandle<()>>>,
}

/// Both tiers plus bookkeeping, guarded together
struct Tiers {
    regular: HashMap<SessionId, CacheEntry<ContextState>>,
    ultra_hot: UltraHotTier<SessionId, ContextState>,
    counters: CacheCounters,
    next_sequence: u64,
}

impl Tiers {
    fn new(config: &HotCacheConfig) -> Self {
        Self {
            regular: HashMap::new(),
            ultra_hot: UltraHotTier::new(config.ultra_hot_capacity),
            counters: CacheCounters::default(),
            next_sequence: 0,
        }
    }

    fn get(&mut self, id: &SessionId, now: DateTime<Utc>, threshold: u64) -> Option<ContextState> {
        if let Some(state) = self.ultra_hot.get(id) {
            let state = state.clone();
            self.counters.ultra_hot_hits += 1;
            debug!("Ultra-hot hit: {}", id);
            return Some(state);
        }

        let Some(entry) = self.regular.get_mut(id) else {
            debug!("Cache miss: {}", id);
            self.counters.misses += 1;
            return None;
        };

        if entry.is_expired(now) {
            debug!("Cache entry expired: {}", id);
            self.regular.remove(id);
            self.counters.expirations += 1;
            self.counters.misses += 1;
            return None;
        }

        self.next_sequence += 1;
        entry.mark_accessed(now);
        entry.sequence = self.next_sequence;
        self.counters.regular_hits += 1;

        let state = entry.value.clone();
        if entry.is_hot(threshold) {
            self.promote(id, state.clone());
        } else {
            debug!("Cache hit: {} (access {})", id, entry.access_count);
        }

        Some(state)
    }

    fn promote(&mut self, id: &SessionId, state: ContextState) {
        if let Some(evicted) = self.ultra_hot.insert(id.clone(), state) {
            debug!("Evicting from ultra-hot tier: {}", evicted);
            self.counters.ultra_hot_evictions += 1;
        }
        self.counters.promotions += 1;
        debug!("Promoted to ultra-hot tier: {}", id);
    }

    fn set(
        &mut self,
        id: &SessionId,
        state: ContextState,
        now: DateTime<Utc>,
        config: &HotCacheConfig,
    ) {
        if !self.regular.contains_key(id) && self.regular.len() >= config.max_entries {
            self.evict_oldest();
        }

        if self.ultra_hot.contains(id) {
            self.ultra_hot.refresh(id, state.clone());
        }

        self.next_sequence += 1;
        let mut entry = CacheEntry::new(state, now, config.ttl);
        entry.sequence = self.next_sequence;

        if self.regular.insert(id.clone(), entry).is_some() {
            debug!("Updating existing cache entry: {}", id);
        } else {
            debug!("Inserting new cache entry: {}", id);
        }
    }

    /// Remove the regular entry with the oldest `last_access`
    fn evict_oldest(&mut self) {
        let oldest = self
            .regular
            .iter()
            .reduce(|a, b| if b.1.accessed_before(a.1) { b } else { a })
            .map(|(id, _)| id.clone());

        if let Some(id) = oldest {
            debug!("Evicting entry due to max_entries limit: {}", id);
            self.regular.remove(&id);
            self.counters.evictions += 1;
        }
    }

    fn delete(&mut self, id: &SessionId) -> bool {
        let regular = self.regular.remove(id).is_some();
        let ultra_hot = self.ultra_hot.remove(id).is_some();
        regular || ultra_hot
    }

    fn sweep_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.regular.len();
        self.regular.retain(|_, entry| !entry.is_expired(now));
        let removed = before - self.regular.len();
        self.counters.expirations += removed as u64;
        removed
    }

    fn stats(&self) -> HotCacheStats {
        let mut oldest_access: Option<DateTime<Utc>> = None;
        let mut newest_access: Option<DateTime<Utc>> = None;
        let mut total_tokens = TokenCount::ZERO;

        for entry in self.regular.values() {
            let at = entry.last_access;
            oldest_access = Some(oldest_access.map_or(at, |t| t.min(at)));
            newest_access = Some(newest_access.map_or(at, |t| t.max(at)));
            total_tokens += entry.value.total_tokens();
        }

        for state in self.ultra_hot.values() {
            total_tokens += state.total_tokens();
        }

        HotCacheStats {
            regular_size: self.regular.len(),
            ultra_hot_size: self.ultra_hot.len(),
            oldest_access,
            newest_access,
            total_tokens_cached: total_tokens,
            counters: self.counters,
        }
    }

    fn clear(&mut self) -> usize {
        let count = self.regular.len();
        self.regular.clear();
        self.ultra_hot.clear();
        self.counters = CacheCounters::default();
        count
    }
}

impl HotCache {
    /// Create a cache on the system clock
    ///
    /// When `enable_auto_cleanup` is set and a tokio runtime is running, the
    /// expiry sweep starts immediately.
    pub fn new(config: HotCacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache reading time from `clock`
    pub fn with_clock(config: HotCacheConfig, clock: Arc<dyn Clock>) -> Self {
        info!("Initializing hot cache with config: {:?}", config);

        let cache = Self {
            tiers: Arc::new(Mutex::new(Tiers::new(&config))),
            config,
            clock,
            cleanup_task: Mutex::new(None),
        };

        if cache.config.enable_auto_cleanup {
            cache.start_cleanup();
        }

        cache
    }

    pub fn config(&self) -> &HotCacheConfig {
        &self.config
    }

    /// Look up the state for `id`
    ///
    /// Checks the ultra-hot tier first, then the regular tier. A regular hit
    /// counts as an access and may promote the entry. Expired entries are
    /// removed and reported as a miss.
    pub fn get(&self, id: &SessionId) -> Option<ContextState> {
        let now = self.clock.now();
        self.tiers
            .lock()
            .get(id, now, self.config.promotion_threshold)
    }

    /// Store `state` under `id` with a fresh TTL
    ///
    /// Resets the access count to 1. An ultra-hot copy, if any, is replaced
    /// and marked most recently used.
    pub fn set(&self, id: &SessionId, state: ContextState) {
        let now = self.clock.now();
        self.tiers.lock().set(id, state, now, &self.config);
    }

    /// Remove `id` from both tiers
    pub fn delete(&self, id: &SessionId) {
        if self.tiers.lock().delete(id) {
            debug!("Removed cache entry: {}", id);
        }
    }

    /// Whether `id` is currently served
    ///
    /// Goes through [`get`](Self::get), so it removes an expired entry and
    /// counts as an access that can promote.
    pub fn has(&self, id: &SessionId) -> bool {
        self.get(id).is_some()
    }

    /// Empty both tiers
    pub fn clear(&self) {
        let count = self.tiers.lock().clear();
        info!("Cleared {} entries from hot cache", count);
    }

    /// Number of regular-tier entries
    pub fn size(&self) -> usize {
        self.tiers.lock().regular.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn get_stats(&self) -> HotCacheStats {
        self.tiers.lock().stats()
    }

    /// Remove every expired regular entry now
    ///
    /// Returns the number removed. This is what the background sweep runs.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = self.tiers.lock().sweep_expired(now);
        if removed > 0 {
            debug!("Cleaned up {} expired entries", removed);
        }
        removed
    }

    /// Start the background sweep if it is not already running
    ///
    /// Returns false when no tokio runtime is available; expired entries are
    /// then only removed lazily on read.
    pub fn start_cleanup(&self) -> bool {
        let mut task = self.cleanup_task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return true;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No tokio runtime available, hot cache sweep disabled");
                return false;
            }
        };

        let interval = self.config.cleanup_interval;
        info!("Starting hot cache sweep (interval: {:?})", interval);
        *task = Some(runtime.spawn(run_sweep(
            Arc::downgrade(&self.tiers),
            Arc::clone(&self.clock),
            interval,
        )));
        true
    }

    /// Stop the background sweep; safe to call repeatedly
    pub fn stop_cleanup(&self) {
        if let Some(handle) = self.cleanup_task.lock().take() {
            handle.abort();
            debug!("Stopped hot cache sweep");
        }
    }

    pub fn is_cleanup_running(&self) -> bool {
        self.cleanup_task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the sweep and drop all entries
    ///
    /// The instance must not be used afterwards.
    pub fn destroy(&self) {
        self.stop_cleanup();
        self.tiers.lock().clear();
        info!("Hot cache destroyed");
    }
}

impl Drop for HotCache {
    fn drop(&mut self) {
        if let Some(handle) = self.cleanup_task.get_mut().take() {
            handle.abort();
        }
    }
}

/// Periodic expiry sweep
///
/// Holds the tiers weakly so a dropped cache ends the task.
async fn run_sweep(tiers: Weak<Mutex<Tiers>>, clock: Arc<dyn Clock>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let Some(store) = tiers.upgrade() else {
            debug!("Hot cache dropped, stopping sweep");
            break;
        };

        let removed = store.lock().sweep_expired(clock.now());
        if removed > 0 {
            debug!("Sweep removed {} expired entries", removed);
        }
    }
}
