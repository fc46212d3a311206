//! Process-wide hot cache
//!
//! Services should construct a [`HotCache`] at startup and pass it to their
//! handlers. This accessor exists for call sites that cannot be threaded
//! through, and [`reset_hot_cache`] gives tests a fresh instance.

use crate::cache::config::HotCacheConfig;
use crate::cache::store::HotCache;
use parking_lot::{const_mutex, Mutex};
use std::sync::Arc;
use tracing::warn;

static HOT_CACHE: Mutex<Option<Arc<HotCache>>> = const_mutex(None);

/// The shared cache, created from [`HotCacheConfig::from_env`] on first use
///
/// An invalid environment falls back to the defaults.
pub fn get_hot_cache() -> Arc<HotCache> {
    let mut slot = HOT_CACHE.lock();
    if let Some(cache) = slot.as_ref() {
        return Arc::clone(cache);
    }

    let config = HotCacheConfig::from_env().unwrap_or_else(|e| {
        warn!("Invalid hot cache configuration, using defaults: {}", e);
        HotCacheConfig::default()
    });
    let cache = Arc::new(HotCache::new(config));
    *slot = Some(Arc::clone(&cache));
    cache
}

/// Destroy the shared cache and forget it; the next access builds a new one
///
/// Handles obtained before the reset point at a destroyed instance.
pub fn reset_hot_cache() {
    if let Some(cache) = HOT_CACHE.lock().take() {
        cache.destroy();
    }
}
