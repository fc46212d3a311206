//! Conversation data model
//!
//! Identifiers and token counts are newtypes so a raw string or number
//! cannot be passed where one is expected. [`ContextState`] is the value the
//! hot cache stores.

pub mod budget;
pub mod state;
pub mod types;

pub use budget::{CacheTier, CompactionResult, RehydrationResult, TokenBudgetConfig};
pub use state::{ChatbotContext, ContextState, GenerateContext};
pub use types::{
    Attachment, ConversationId, Message, MessageRole, RagChunk, SessionId, TokenCount,
};
