//! Configuration for the hot cache

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for [`HotCache`](crate::cache::HotCache)
///
/// The defaults are the production values: a 15 minute TTL, 1000 regular
/// entries, a 10 entry ultra-hot tier entered on the 3rd access, and a sweep
/// every minute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotCacheConfig {
    /// Time-to-live of a regular-tier entry, reset on every `set`
    pub ttl: Duration,

    /// Maximum number of regular-tier entries
    pub max_entries: usize,

    /// Maximum number of ultra-hot entries
    pub ultra_hot_capacity: usize,

    /// Access count at which a regular entry is copied into the ultra-hot tier
    pub promotion_threshold: u64,

    /// Run the periodic expiry sweep
    pub enable_auto_cleanup: bool,

    /// Interval between sweeps
    pub cleanup_interval: Duration,
}

impl Default for HotCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15 * 60),
            max_entries: 1_000,
            ultra_hot_capacity: 10,
            promotion_threshold: 3,
            enable_auto_cleanup: true,
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl HotCacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> HotCacheConfigBuilder {
        HotCacheConfigBuilder::default()
    }

    /// Production defaults with the background sweep turned off
    pub fn for_tests() -> Self {
        Self {
            enable_auto_cleanup: false,
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::ConfigError(
                "max_entries must be greater than 0".to_string(),
            ));
        }

        if self.ultra_hot_capacity == 0 {
            return Err(CacheError::ConfigError(
                "ultra_hot_capacity must be greater than 0".to_string(),
            ));
        }

        if self.promotion_threshold == 0 {
            return Err(CacheError::ConfigError(
                "promotion_threshold must be greater than 0".to_string(),
            ));
        }

        if self.ttl.is_zero() {
            return Err(CacheError::ConfigError("ttl must be non-zero".to_string()));
        }

        if self.enable_auto_cleanup && self.cleanup_interval.is_zero() {
            return Err(CacheError::ConfigError(
                "cleanup_interval must be non-zero when auto cleanup is enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from the environment, reading `.env` first if present
    ///
    /// Recognized variables: `HOT_CACHE_TTL_SECS`, `HOT_CACHE_MAX_ENTRIES`,
    /// `HOT_CACHE_ULTRA_HOT_CAPACITY`, `HOT_CACHE_PROMOTION_THRESHOLD`,
    /// `HOT_CACHE_CLEANUP_INTERVAL_SECS` and `HOT_CACHE_AUTO_CLEANUP`.
    /// `APP_ENV=test` turns the sweep off.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(secs) = parse_var::<u64, _>(&lookup, "HOT_CACHE_TTL_SECS")? {
            builder = builder.ttl(Duration::from_secs(secs));
        }
        if let Some(max) = parse_var::<usize, _>(&lookup, "HOT_CACHE_MAX_ENTRIES")? {
            builder = builder.max_entries(max);
        }
        if let Some(cap) = parse_var::<usize, _>(&lookup, "HOT_CACHE_ULTRA_HOT_CAPACITY")? {
            builder = builder.ultra_hot_capacity(cap);
        }
        if let Some(threshold) = parse_var::<u64, _>(&lookup, "HOT_CACHE_PROMOTION_THRESHOLD")? {
            builder = builder.promotion_threshold(threshold);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "HOT_CACHE_CLEANUP_INTERVAL_SECS")? {
            builder = builder.cleanup_interval(Duration::from_secs(secs));
        }
        if let Some(enable) = parse_var::<bool, _>(&lookup, "HOT_CACHE_AUTO_CLEANUP")? {
            builder = builder.enable_auto_cleanup(enable);
        }
        if lookup("APP_ENV").is_some_and(|env| env.eq_ignore_ascii_case("test")) {
            debug!("APP_ENV=test, disabling hot cache sweep");
            builder = builder.enable_auto_cleanup(false);
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| CacheError::InvalidEnvVar {
                name: name.to_string(),
                value: raw,
            }),
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct HotCacheConfigBuilder {
    ttl: Option<Duration>,
    max_entries: Option<usize>,
    ultra_hot_capacity: Option<usize>,
    promotion_threshold: Option<u64>,
    enable_auto_cleanup: Option<bool>,
    cleanup_interval: Option<Duration>,
}

impl HotCacheConfigBuilder {
    /// Set the regular-tier TTL
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the regular-tier capacity
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Set the ultra-hot tier capacity
    pub fn ultra_hot_capacity(mut self, capacity: usize) -> Self {
        self.ultra_hot_capacity = Some(capacity);
        self
    }

    /// Set the access count that promotes an entry
    pub fn promotion_threshold(mut self, threshold: u64) -> Self {
        self.promotion_threshold = Some(threshold);
        self
    }

    /// Enable or disable the background sweep
    pub fn enable_auto_cleanup(mut self, enable: bool) -> Self {
        self.enable_auto_cleanup = Some(enable);
        self
    }

    /// Set the sweep interval
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> HotCacheConfig {
        let defaults = HotCacheConfig::default();

        HotCacheConfig {
            ttl: self.ttl.unwrap_or(defaults.ttl),
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            ultra_hot_capacity: self
                .ultra_hot_capacity
                .unwrap_or(defaults.ultra_hot_capacity),
            promotion_threshold: self
                .promotion_threshold
                .unwrap_or(defaults.promotion_threshold),
            enable_auto_cleanup: self
                .enable_auto_cleanup
                .unwrap_or(defaults.enable_auto_cleanup),
            cleanup_interval: self.cleanup_interval.unwrap_or(defaults.cleanup_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = HotCacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(900));
        assert_eq!(config.max_entries, 1_000);
        assert_eq!(config.ultra_hot_capacity, 10);
        assert_eq!(config.promotion_threshold, 3);
        assert_eq!(config.cleanup_interval, Duration::from_secs(60));
        assert!(config.enable_auto_cleanup);
        assert!(!HotCacheConfig::for_tests().enable_auto_cleanup);
    }

    #[test]
    fn test_config_validation() {
        assert!(HotCacheConfig::default().validate().is_ok());

        let mut invalid = HotCacheConfig::default();
        invalid.max_entries = 0;
        assert!(invalid.validate().is_err());

        let mut invalid = HotCacheConfig::default();
        invalid.ultra_hot_capacity = 0;
        assert!(invalid.validate().is_err());

        let mut invalid = HotCacheConfig::default();
        invalid.cleanup_interval = Duration::ZERO;
        assert!(invalid.validate().is_err());

        invalid.enable_auto_cleanup = false;
        assert!(invalid.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = HotCacheConfig::builder()
            .ttl(Duration::from_secs(60))
            .max_entries(5)
            .ultra_hot_capacity(2)
            .build();

        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.max_entries, 5);
        assert_eq!(config.ultra_hot_capacity, 2);
        assert_eq!(config.promotion_threshold, 3);
    }

    #[test]
    fn test_from_lookup() {
        let config = HotCacheConfig::from_lookup(lookup_from(&[
            ("HOT_CACHE_TTL_SECS", "120"),
            ("HOT_CACHE_MAX_ENTRIES", " 50 "),
            ("HOT_CACHE_AUTO_CLEANUP", "true"),
        ]))
        .unwrap();

        assert_eq!(config.ttl, Duration::from_secs(120));
        assert_eq!(config.max_entries, 50);
        assert!(config.enable_auto_cleanup);
    }

    #[test]
    fn test_from_lookup_test_env_disables_sweep() {
        let config = HotCacheConfig::from_lookup(lookup_from(&[
            ("HOT_CACHE_AUTO_CLEANUP", "true"),
            ("APP_ENV", "test"),
        ]))
        .unwrap();
        assert!(!config.enable_auto_cleanup);
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = HotCacheConfig::from_lookup(lookup_from(&[("HOT_CACHE_TTL_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidEnvVar { .. }));

        let err = HotCacheConfig::from_lookup(lookup_from(&[("HOT_CACHE_MAX_ENTRIES", "0")]))
            .unwrap_err();
        assert!(matches!(err, CacheError::ConfigError(_)));
    }
}
