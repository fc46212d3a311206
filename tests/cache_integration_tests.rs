//! Integration tests for the hot cache
//!
//! These tests verify the complete cache behaviour including:
//! - TTL expiration against a controlled clock
//! - Capacity eviction at production scale
//! - Promotion into and eviction from the ultra-hot tier
//! - Chatbot narrowing
//! - Concurrent access from a multi-threaded runtime

use chatbot_context_cache::cache::{ChatbotCache, HotCache, HotCacheConfig, ManualClock};
use chatbot_context_cache::context::{
    CacheTier, ChatbotContext, ContextState, ConversationId, GenerateContext, Message, RagChunk,
    RehydrationResult, SessionId, TokenCount,
};
use std::sync::Arc;
use std::time::Duration;

fn cache_with_clock() -> (Arc<HotCache>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let cache = Arc::new(HotCache::with_clock(
        HotCacheConfig::for_tests(),
        clock.clone(),
    ));
    (cache, clock)
}

fn sid(id: impl Into<String>) -> SessionId {
    SessionId::new(id)
}

fn generate_state(id: &str) -> ContextState {
    GenerateContext::new(SessionId::new(id)).into()
}

/// Read an entry until it has been promoted
fn promote(cache: &HotCache, id: &SessionId) {
    let before = cache.get_stats().ultra_hot_size;
    for _ in 0..2 {
        assert!(cache.get(id).is_some());
    }
    assert!(cache.get_stats().ultra_hot_size >= before);
}

#[test]
fn test_delete_twice() {
    let (cache, _) = cache_with_clock();
    cache.set(&sid("s1"), generate_state("s1"));

    cache.delete(&sid("s1"));
    let after_first = cache.get_stats();
    cache.delete(&sid("s1"));
    let after_second = cache.get_stats();

    assert_eq!(after_first, after_second);
    assert!(!cache.has(&sid("s1")));
}

#[test]
fn test_ttl_expiration() {
    let (cache, clock) = cache_with_clock();
    let state = generate_state("s1");

    cache.set(&sid("s1"), state.clone());
    cache.set(&sid("s2"), generate_state("s2"));
    assert_eq!(cache.get(&sid("s1")), Some(state));
    assert_eq!(cache.size(), 2);

    clock.advance(Duration::from_secs(15 * 60 + 1));

    assert!(cache.get(&sid("s1")).is_none());
    assert_eq!(cache.size(), 1);
}

#[test]
fn test_capacity_never_exceeded() {
    let (cache, clock) = cache_with_clock();

    for i in 0..1000 {
        cache.set(&sid(format!("s-{}", i)), generate_state("x"));
        clock.advance(Duration::from_millis(1));
    }
    assert_eq!(cache.size(), 1000);

    // s-0 becomes the most recent, leaving s-1 as the oldest
    assert!(cache.get(&sid("s-0")).is_some());
    clock.advance(Duration::from_millis(1));

    cache.set(&sid("s-1000"), generate_state("x"));
    assert_eq!(cache.size(), 1000);

    let stats = cache.get_stats();
    assert_eq!(stats.regular_size, 1000);
    assert_eq!(stats.counters.evictions, 1);
    assert!(cache.get(&sid("s-1")).is_none());
    assert!(cache.get(&sid("s-0")).is_some());
    assert!(cache.get(&sid("s-2")).is_some());
    assert!(cache.get(&sid("s-1000")).is_some());
}

#[test]
fn test_promotion_after_three_reads() {
    let (cache, clock) = cache_with_clock();
    cache.set(&sid("s1"), generate_state("s1"));

    let before = cache.get_stats().ultra_hot_size;
    for _ in 0..3 {
        cache.get(&sid("s1"));
    }
    assert_eq!(cache.get_stats().ultra_hot_size, before + 1);

    // drop the regular copy only
    clock.advance(Duration::from_secs(20 * 60));
    assert_eq!(cache.cleanup_expired(), 1);
    assert_eq!(cache.size(), 0);

    assert!(cache.get(&sid("s1")).is_some());
}

#[test]
fn test_ultra_hot_eviction_respects_recency() {
    let (cache, clock) = cache_with_clock();
    let ids: Vec<SessionId> = (0..11).map(|i| sid(format!("hot-{}", i))).collect();

    for id in &ids {
        cache.set(id, generate_state(id.as_str()));
    }
    for id in &ids[..10] {
        promote(&cache, id);
    }
    assert_eq!(cache.get_stats().ultra_hot_size, 10);

    // hot-0 was promoted first; touching it leaves hot-1 as the LRU member
    assert!(cache.get(&ids[0]).is_some());
    promote(&cache, &ids[10]);

    let stats = cache.get_stats();
    assert_eq!(stats.ultra_hot_size, 10);
    assert_eq!(stats.counters.ultra_hot_evictions, 1);

    // expire the regular tier so only ultra-hot copies remain
    clock.advance(Duration::from_secs(16 * 60));
    cache.cleanup_expired();
    assert_eq!(cache.size(), 0);

    assert!(cache.get(&ids[1]).is_none(), "least recently used member evicted");
    assert!(cache.get(&ids[0]).is_some(), "touched member protected");
    for id in &ids[2..] {
        assert!(cache.get(id).is_some(), "{} should still be ultra-hot", id);
    }
}

#[test]
fn test_ultra_hot_never_exceeds_capacity() {
    let (cache, _) = cache_with_clock();

    for i in 0..50 {
        let id = sid(format!("s-{}", i));
        cache.set(&id, generate_state(id.as_str()));
        promote(&cache, &id);
        assert!(cache.get_stats().ultra_hot_size <= 10);
    }
    assert_eq!(cache.get_stats().counters.promotions, 50);
}

#[test]
fn test_write_refreshes_both_tiers() {
    let (cache, clock) = cache_with_clock();
    let id = sid("s1");
    cache.set(&id, generate_state("s1"));
    promote(&cache, &id);

    let mut updated = generate_state("s1");
    updated.push_message(Message::user("second turn"));
    cache.set(&id, updated.clone());

    assert_eq!(cache.get(&id), Some(updated.clone()));

    clock.advance(Duration::from_secs(16 * 60));
    cache.cleanup_expired();
    assert_eq!(cache.get(&id), Some(updated), "ultra-hot copy was refreshed too");
}

#[test]
fn test_chatbot_narrowing() {
    let (cache, _) = cache_with_clock();
    let chatbots = ChatbotCache::from_cache(cache.clone());
    let id = ConversationId::new("c1");

    let ctx = ChatbotContext::new(id.clone()).with_rag(
        vec![RagChunk::new("chunk-9", "pricing.pdf", "Plans start at $29")],
        "7f3a",
        "kb-2024-06",
    );
    chatbots.set_chatbot_conversation(&id, ctx.clone());
    assert_eq!(chatbots.get_chatbot_conversation(&id), Some(ctx));

    cache.set(&sid("c1"), generate_state("c1"));
    assert!(chatbots.get_chatbot_conversation(&id).is_none());
}

#[test]
fn test_turn_cycle_with_rehydration() {
    let (cache, _) = cache_with_clock();
    let id = sid("session-7");

    // durable copy, as the storage layer would hand it back
    let mut stored = generate_state("session-7");
    stored.push_message(Message::user("a".repeat(50)));
    let record = stored.to_json().unwrap();

    let state = match cache.get(&id) {
        Some(state) => state,
        None => {
            let rehydrated = RehydrationResult {
                state: ContextState::from_json(&record).unwrap(),
                source: CacheTier::Cold,
                load_time_ms: 4,
                compacted: false,
            };
            rehydrated.state
        }
    };
    assert_eq!(state.total_tokens(), TokenCount::new(23));

    let mut state = state;
    state.push_message(Message::assistant("b".repeat(8)));
    cache.set(&id, state);

    let cached = cache.get(&id).unwrap();
    assert_eq!(cached.message_count(), 2);
    assert_eq!(cached.total_tokens(), TokenCount::new(35));
    assert_eq!(cache.get_stats().total_tokens_cached, TokenCount::new(35));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_access_respects_bounds() {
    let config = HotCacheConfig::builder()
        .max_entries(100)
        .enable_auto_cleanup(false)
        .build();
    let cache = Arc::new(HotCache::new(config));

    let tasks = (0..8).map(|worker| {
        let cache = cache.clone();
        tokio::spawn(async move {
            for i in 0..200 {
                let id = SessionId::new(format!("w{}-s{}", worker, i % 60));
                cache.set(&id, GenerateContext::new(id.clone()).into());
                cache.get(&id);
                cache.get(&id);
                if i % 7 == 0 {
                    cache.delete(&id);
                }
            }
        })
    });

    for result in futures::future::join_all(tasks).await {
        result.unwrap();
    }

    let stats = cache.get_stats();
    assert!(stats.regular_size <= 100);
    assert!(stats.ultra_hot_size <= 10);
}

#[tokio::test]
async fn test_background_sweep() {
    let clock = Arc::new(ManualClock::default());
    let config = HotCacheConfig::builder()
        .cleanup_interval(Duration::from_millis(25))
        .build();
    let cache = HotCache::with_clock(config, clock.clone());

    cache.set(&sid("s1"), generate_state("s1"));
    cache.set(&sid("s2"), generate_state("s2"));
    clock.advance(Duration::from_secs(16 * 60));
    cache.set(&sid("s3"), generate_state("s3"));

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(cache.size(), 1);
    assert_eq!(cache.get_stats().counters.expirations, 2);

    cache.stop_cleanup();
    cache.stop_cleanup();
}
