//! Chatbot-specific view of the hot cache
//!
//! Conversation ids and session ids are structurally identical strings, so
//! a generate-flavored state can end up stored under an id a chatbot handler
//! asks for. Reads here check the variant and treat a mismatch as a miss.

use crate::cache::store::HotCache;
use crate::context::{ChatbotContext, ContextState, ConversationId};
use std::sync::Arc;
use tracing::debug;

/// Chatbot conversation cache
///
/// Shares the underlying [`HotCache`] with every other user of it.
#[derive(Clone)]
pub struct ChatbotCache {
    cache: Arc<HotCache>,
}

impl ChatbotCache {
    /// Create from existing cache instance
    pub fn from_cache(cache: Arc<HotCache>) -> Self {
        Self { cache }
    }

    /// Get the underlying cache instance
    pub fn inner(&self) -> Arc<HotCache> {
        self.cache.clone()
    }

    /// Cached chatbot state for `id`, or `None` if absent or not a chatbot state
    pub fn get_chatbot_conversation(&self, id: &ConversationId) -> Option<ChatbotContext> {
        match self.cache.get(&id.to_session_key())? {
            ContextState::Chatbot(ctx) => Some(ctx),
            ContextState::Generate(_) => {
                debug!("Non-chatbot state cached under conversation id: {}", id);
                None
            }
        }
    }

    pub fn set_chatbot_conversation(&self, id: &ConversationId, context: ChatbotContext) {
        self.cache.set(&id.to_session_key(), ContextState::Chatbot(context));
    }

    pub fn delete_chatbot_conversation(&self, id: &ConversationId) {
        self.cache.delete(&id.to_session_key());
    }

    /// Whether a chatbot state is served for `id`
    ///
    /// Same side effects as [`HotCache::has`].
    pub fn has_chatbot_conversation(&self, id: &ConversationId) -> bool {
        self.get_chatbot_conversation(id).is_some()
    }
}
