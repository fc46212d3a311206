//! Tagged conversation state
//!
//! [`ContextState`] serializes with a `__type` discriminator so durable
//! storage and the cache agree on which flavor of conversation a record
//! holds.

use crate::context::types::{ConversationId, Message, RagChunk, SessionId, TokenCount};
use crate::error::Result;
use crate::tokens;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of a "generate" conversation (dashboard content generation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContext {
    pub session_id: SessionId,
    pub messages: Vec<Message>,
    pub total_tokens: TokenCount,
    pub message_count: usize,
    pub last_updated: DateTime<Utc>,
    /// Invalidation counter owned by the caller
    pub version: u64,
}

impl GenerateContext {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            messages: Vec::new(),
            total_tokens: TokenCount::ZERO,
            message_count: 0,
            last_updated: Utc::now(),
            version: 0,
        }
    }
}

/// State of an embedded chatbot conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatbotContext {
    pub conversation_id: ConversationId,
    pub messages: Vec<Message>,
    pub total_tokens: TokenCount,
    pub message_count: usize,
    pub last_updated: DateTime<Utc>,
    /// Invalidation counter owned by the caller
    pub version: u64,

    /// Chunks from the last retrieval run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_chunks: Option<Vec<RagChunk>>,

    /// Hash of the query that produced `rag_chunks`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag_query_hash: Option<String>,

    /// Knowledge base version `rag_chunks` were retrieved against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base_version: Option<String>,
}

impl ChatbotContext {
    pub fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            messages: Vec::new(),
            total_tokens: TokenCount::ZERO,
            message_count: 0,
            last_updated: Utc::now(),
            version: 0,
            rag_chunks: None,
            rag_query_hash: None,
            knowledge_base_version: None,
        }
    }

    /// Attach retrieval results together with the keys that validate them
    pub fn with_rag(
        mut self,
        chunks: Vec<RagChunk>,
        query_hash: impl Into<String>,
        knowledge_base_version: impl Into<String>,
    ) -> Self {
        self.rag_chunks = Some(chunks);
        self.rag_query_hash = Some(query_hash.into());
        self.knowledge_base_version = Some(knowledge_base_version.into());
        self
    }
}

/// Conversation state held by the hot cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__type", rename_all = "lowercase")]
pub enum ContextState {
    Generate(GenerateContext),
    Chatbot(ChatbotContext),
}

impl ContextState {
    /// Raw identifier of the conversation, whichever flavor it is
    pub fn id(&self) -> &str {
        match self {
            ContextState::Generate(ctx) => ctx.session_id.as_str(),
            ContextState::Chatbot(ctx) => ctx.conversation_id.as_str(),
        }
    }

    pub fn is_chatbot(&self) -> bool {
        matches!(self, ContextState::Chatbot(_))
    }

    pub fn messages(&self) -> &[Message] {
        match self {
            ContextState::Generate(ctx) => &ctx.messages,
            ContextState::Chatbot(ctx) => &ctx.messages,
        }
    }

    pub fn total_tokens(&self) -> TokenCount {
        match self {
            ContextState::Generate(ctx) => ctx.total_tokens,
            ContextState::Chatbot(ctx) => ctx.total_tokens,
        }
    }

    pub fn message_count(&self) -> usize {
        match self {
            ContextState::Generate(ctx) => ctx.message_count,
            ContextState::Chatbot(ctx) => ctx.message_count,
        }
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        match self {
            ContextState::Generate(ctx) => ctx.last_updated,
            ContextState::Chatbot(ctx) => ctx.last_updated,
        }
    }

    pub fn version(&self) -> u64 {
        match self {
            ContextState::Generate(ctx) => ctx.version,
            ContextState::Chatbot(ctx) => ctx.version,
        }
    }

    pub fn as_chatbot(&self) -> Option<&ChatbotContext> {
        match self {
            ContextState::Chatbot(ctx) => Some(ctx),
            ContextState::Generate(_) => None,
        }
    }

    pub fn into_chatbot(self) -> Option<ChatbotContext> {
        match self {
            ContextState::Chatbot(ctx) => Some(ctx),
            ContextState::Generate(_) => None,
        }
    }

    /// Append a message, filling in its token estimate, and refresh the totals
    pub fn push_message(&mut self, message: Message) {
        let message = tokens::with_token_count(&message);
        let now = Utc::now();
        match self {
            ContextState::Generate(ctx) => {
                ctx.messages.push(message);
                ctx.last_updated = now;
            }
            ContextState::Chatbot(ctx) => {
                ctx.messages.push(message);
                ctx.last_updated = now;
            }
        }
        self.recompute_totals();
    }

    /// Recalculate `total_tokens` and `message_count` from the message list
    pub fn recompute_totals(&mut self) {
        let (messages, total_tokens, message_count) = match self {
            ContextState::Generate(ctx) => {
                (&ctx.messages, &mut ctx.total_tokens, &mut ctx.message_count)
            }
            ContextState::Chatbot(ctx) => {
                (&ctx.messages, &mut ctx.total_tokens, &mut ctx.message_count)
            }
        };
        *total_tokens = tokens::calculate_total_tokens(messages);
        *message_count = messages.len();
    }

    /// Serialize for durable storage
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize a record loaded from durable storage
    pub fn from_json(value: &str) -> Result<Self> {
        Ok(serde_json::from_str(value)?)
    }
}

impl From<GenerateContext> for ContextState {
    fn from(ctx: GenerateContext) -> Self {
        ContextState::Generate(ctx)
    }
}

impl From<ChatbotContext> for ContextState {
    fn from(ctx: ChatbotContext) -> Self {
        ContextState::Chatbot(ctx)
    }
}
