//! Token estimation
//!
//! A cheap, deterministic length heuristic used whenever the model provider
//! has not reported an authoritative count. It does not try to match any
//! real tokenizer.

use crate::context::types::{Message, MessageRole, TokenCount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Characters per estimated token
pub const CHARS_PER_TOKEN: u64 = 4;

/// Flat cost added for each attachment
pub const ATTACHMENT_TOKEN_OVERHEAD: u64 = 20;

/// Flat cost added for each message (role markers, separators)
pub const MESSAGE_TOKEN_OVERHEAD: u64 = 10;

fn tokens_for_len(len: usize) -> u64 {
    (len as u64).div_ceil(CHARS_PER_TOKEN)
}

/// Estimate the tokens a message occupies in the context window
///
/// Returns `tokens_used` unchanged when it is present and positive.
pub fn estimate_message_tokens(message: &Message) -> TokenCount {
    if let Some(known) = message.tokens_used {
        if !known.is_zero() {
            return known;
        }
    }

    let content = tokens_for_len(message.content.chars().count());
    let attachments = message.attachments.len() as u64 * ATTACHMENT_TOKEN_OVERHEAD;
    TokenCount::new(content + attachments + MESSAGE_TOKEN_OVERHEAD)
}

/// Sum of [`estimate_message_tokens`] over `messages`
pub fn calculate_total_tokens(messages: &[Message]) -> TokenCount {
    messages.iter().map(estimate_message_tokens).sum()
}

/// Estimate a standalone string such as a system prompt
pub fn estimate_text_tokens(text: &str) -> TokenCount {
    TokenCount::new(tokens_for_len(text.chars().count()))
}

/// Copy of `message` with `tokens_used` filled in when absent
pub fn with_token_count(message: &Message) -> Message {
    let mut copy = message.clone();
    if copy.tokens_used.is_none() {
        copy.tokens_used = Some(estimate_message_tokens(message));
    }
    copy
}

pub fn batch_add_token_counts(messages: &[Message]) -> Vec<Message> {
    messages.iter().map(with_token_count).collect()
}

/// Token usage broken down by role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDistribution {
    pub total: TokenCount,
    /// Summed estimate per role; roles without messages are absent
    pub by_role: BTreeMap<MessageRole, TokenCount>,
    /// Mean estimate per message, 0.0 for an empty list
    pub average: f64,
    pub max: TokenCount,
    /// Smallest per-message estimate, zero for an empty list
    pub min: TokenCount,
}

/// Compute the distribution of estimated tokens across `messages`
///
/// Each message is estimated exactly once.
pub fn get_token_distribution(messages: &[Message]) -> TokenDistribution {
    let estimates: Vec<(MessageRole, TokenCount)> = messages
        .iter()
        .map(|m| (m.role, estimate_message_tokens(m)))
        .collect();

    let mut by_role: BTreeMap<MessageRole, TokenCount> = BTreeMap::new();
    for (role, tokens) in &estimates {
        *by_role.entry(*role).or_default() += *tokens;
    }

    let total: TokenCount = estimates.iter().map(|(_, t)| *t).sum();
    let max = estimates.iter().map(|(_, t)| *t).max().unwrap_or_default();
    let min = estimates.iter().map(|(_, t)| *t).min().unwrap_or_default();
    let average = if estimates.is_empty() {
        0.0
    } else {
        total.get() as f64 / estimates.len() as f64
    };

    TokenDistribution {
        total,
        by_role,
        average,
        max,
        min,
    }
}
