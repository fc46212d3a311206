//! Types exchanged with the token budget and rehydration collaborators
//!
//! The cache keeps `total_tokens` current; deciding when to compact and
//! loading state back from durable storage happen outside this crate.

use crate::context::state::ContextState;
use crate::context::types::TokenCount;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token budget applied to a conversation before it is sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBudgetConfig {
    /// Model context window
    pub max_context_tokens: TokenCount,

    /// Tokens held back for the model's reply
    pub reserved_for_response: TokenCount,

    /// Fraction of the usable window that triggers compaction (0.0 - 1.0)
    pub compaction_threshold: f64,

    /// Most recent messages that compaction must keep verbatim
    pub keep_recent_messages: usize,
}

impl Default for TokenBudgetConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: TokenCount::new(128_000),
            reserved_for_response: TokenCount::new(4_096),
            compaction_threshold: 0.8,
            keep_recent_messages: 10,
        }
    }
}

/// Outcome of a compaction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompactionResult {
    pub state: ContextState,
    pub messages_removed: usize,
    pub tokens_before: TokenCount,
    pub tokens_after: TokenCount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Where rehydrated state came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTier {
    /// In-process hot cache
    Hot,
    /// Shared cache in front of the database
    Warm,
    /// Durable storage
    Cold,
}

impl fmt::Display for CacheTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheTier::Hot => write!(f, "hot"),
            CacheTier::Warm => write!(f, "warm"),
            CacheTier::Cold => write!(f, "cold"),
        }
    }
}

/// State handed back by the rehydration path after a cache miss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RehydrationResult {
    pub state: ContextState,
    pub source: CacheTier,
    pub load_time_ms: u64,
    /// Whether compaction ran while loading
    pub compacted: bool,
}
