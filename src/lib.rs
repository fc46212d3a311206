//! # Chatbot Context Cache (chatbot-context-cache)
//!
//! In-process cache of conversational state for lead-capture chatbots.
//!
//! ## Features
//!
//! - Two-tier hot cache: TTL-bounded regular tier plus a small,
//!   frequency-promoted LRU tier for the busiest sessions
//! - Tagged conversation state (`generate` / `chatbot`) with newtype ids
//! - Length-based token estimation for messages and prompts
//! - Chatbot façade that never returns a wrongly-typed state
//! - Background expiry sweep on tokio
//!
//! ## Request flow
//!
//! ```rust
//! use std::sync::Arc;
//! use chatbot_context_cache::{ChatbotCache, ChatbotContext, ConversationId, HotCache, HotCacheConfig, Message};
//!
//! let hot = Arc::new(HotCache::new(HotCacheConfig::for_tests()));
//! let chatbots = ChatbotCache::from_cache(hot.clone());
//! let id = ConversationId::new("conv-1");
//!
//! // miss -> rehydrate from durable storage (here: start fresh)
//! let mut ctx = chatbots
//!     .get_chatbot_conversation(&id)
//!     .unwrap_or_else(|| ChatbotContext::new(id.clone()));
//! ctx.messages.push(Message::user("Can I book a viewing on Saturday?"));
//! ctx.total_tokens = chatbot_context_cache::tokens::calculate_total_tokens(&ctx.messages);
//! ctx.message_count = ctx.messages.len();
//! chatbots.set_chatbot_conversation(&id, ctx);
//!
//! assert_eq!(hot.size(), 1);
//! ```

pub mod cache;
pub mod context;
pub mod error;
pub mod tokens;

// Re-export main types for convenience
pub use cache::{
    get_hot_cache, reset_hot_cache, CacheCounters, CacheEntry, ChatbotCache, Clock, HotCache,
    HotCacheConfig, HotCacheConfigBuilder, HotCacheStats, ManualClock, SystemClock,
};
pub use context::{
    Attachment, CacheTier, ChatbotContext, CompactionResult, ContextState, ConversationId,
    GenerateContext, Message, MessageRole, RagChunk, RehydrationResult, SessionId,
    TokenBudgetConfig, TokenCount,
};
pub use error::{CacheError, Result};
pub use tokens::TokenDistribution;
