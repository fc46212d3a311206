//! Hot Cache Demo Application
//!
//! Simulates a few chat sessions turning over against the hot cache and
//! prints the resulting statistics.
//!
//! Usage:
//!   cargo run --example hot_cache_demo
//!
//! Environment variables (also read from `.env`):
//!   HOT_CACHE_TTL_SECS, HOT_CACHE_MAX_ENTRIES, HOT_CACHE_ULTRA_HOT_CAPACITY,
//!   HOT_CACHE_PROMOTION_THRESHOLD, HOT_CACHE_CLEANUP_INTERVAL_SECS,
//!   HOT_CACHE_AUTO_CLEANUP
//!   RUST_LOG - log filter (default: info)

use chatbot_context_cache::{
    tokens, ChatbotCache, ChatbotContext, ConversationId, GenerateContext, HotCache,
    HotCacheConfig, Message, SessionId,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("=== Hot Cache Demo ===");

    let config = HotCacheConfig::from_env()?;
    let cache = Arc::new(HotCache::new(config));
    let chatbots = ChatbotCache::from_cache(cache.clone());

    info!("\n--- Dashboard generate sessions ---");
    for turn in 0..4 {
        for session in ["gen-a", "gen-b"] {
            let id = SessionId::new(session);
            let mut state = cache
                .get(&id)
                .unwrap_or_else(|| GenerateContext::new(id.clone()).into());
            state.push_message(Message::user(format!("Draft section {} please", turn)));
            state.push_message(Message::assistant("Here is a first draft of that section."));
            cache.set(&id, state);
        }
    }

    info!("\n--- Embedded chatbot conversation ---");
    let conversation = ConversationId::new("widget-42");
    let mut ctx = chatbots
        .get_chatbot_conversation(&conversation)
        .unwrap_or_else(|| ChatbotContext::new(conversation.clone()));
    ctx.messages = tokens::batch_add_token_counts(&[
        Message::system("You are the booking assistant for a dental clinic."),
        Message::user("Do you have anything free on Thursday afternoon?"),
    ]);
    ctx.total_tokens = tokens::calculate_total_tokens(&ctx.messages);
    ctx.message_count = ctx.messages.len();
    chatbots.set_chatbot_conversation(&conversation, ctx);

    let distribution = chatbots
        .get_chatbot_conversation(&conversation)
        .map(|ctx| tokens::get_token_distribution(&ctx.messages));
    info!("Chatbot token distribution: {:?}", distribution);

    let generate_id = ConversationId::new("gen-a");
    info!(
        "Chatbot lookup of a generate session: {:?}",
        chatbots.get_chatbot_conversation(&generate_id).map(|c| c.conversation_id)
    );

    info!("\n--- Statistics ---");
    let stats = cache.get_stats();
    info!("{}", stats);
    info!("{}", serde_json::to_string_pretty(&stats)?);

    cache.destroy();
    info!("\n=== Demo Complete ===");
    Ok(())
}
