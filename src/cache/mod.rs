//! # Hot Context Cache
//!
//! Two-tier in-memory cache for conversation state, so per-turn request
//! handling skips the database round-trip and token recomputation.
//!
//! ## Tiers
//!
//! - **Regular**: TTL-bounded (15 minutes from the last write) and
//!   count-bounded (1000 entries, least recently accessed evicted first)
//! - **Ultra-hot**: up to 10 conversations read at least 3 times, kept in
//!   LRU order with no expiry
//!
//! A background sweep removes expired regular entries every minute when a
//! tokio runtime is available; otherwise expiry happens lazily on read.
//!
//! ## Example
//!
//! ```rust
//! use chatbot_context_cache::cache::{HotCache, HotCacheConfig};
//! use chatbot_context_cache::context::{GenerateContext, Message, SessionId};
//!
//! let cache = HotCache::new(HotCacheConfig::for_tests());
//! let id = SessionId::new("session-42");
//!
//! let mut state = cache
//!     .get(&id)
//!     .unwrap_or_else(|| GenerateContext::new(id.clone()).into());
//! state.push_message(Message::user("Write a welcome email"));
//! cache.set(&id, state);
//!
//! assert!(cache.has(&id));
//! ```

pub mod chatbot;
pub mod clock;
pub mod config;
pub mod entry;
pub mod global;
mod lru;
pub mod store;
pub mod types;

pub use chatbot::ChatbotCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{HotCacheConfig, HotCacheConfigBuilder};
pub use entry::CacheEntry;
pub use global::{get_hot_cache, reset_hot_cache};
pub use store::HotCache;
pub use types::{CacheCounters, HotCacheStats};
