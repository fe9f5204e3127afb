//! # Prompt Cache
//!
//! An in-memory, TTL-bounded cache from `provider:prompt` to the
//! [`CanonicalResponse`] that provider returned for that exact prompt.
//!
//! Entries are never mutated, only created on a successful provider call
//! and removed on TTL expiry (checked lazily, on lookup) or an admin
//! flush. There is no single-flight deduplication — two concurrent
//! identical requests can both miss the cache and both call the provider;
//! that's an accepted tradeoff for keeping the lock simple, not an
//! oversight.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::RwLock;
use ultrafast_models_sdk::CanonicalResponse;

#[derive(Debug, Clone)]
struct CacheEntry {
    response: CanonicalResponse,
    timestamp_seconds: u64,
}

pub struct PromptCache {
    ttl_seconds: u64,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

fn now_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs()
}

impl PromptCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl_seconds,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn key(provider: &str, prompt: &str) -> String {
        format!("{provider}:{prompt}")
    }

    /// Returns the cached response if present and not yet expired. A
    /// lookup that finds a stale entry removes it before returning `None`.
    pub async fn lookup(&self, provider: &str, prompt: &str) -> Option<CanonicalResponse> {
        let key = Self::key(provider, prompt);
        let now = now_seconds();

        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(&key) {
                if now.saturating_sub(entry.timestamp_seconds) < self.ttl_seconds {
                    return Some(entry.response.clone());
                }
            } else {
                return None;
            }
        }

        let mut entries = self.entries.write().await;
        entries.remove(&key);
        None
    }

    pub async fn store(&self, provider: &str, prompt: &str, response: CanonicalResponse) {
        let key = Self::key(provider, prompt);
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                response,
                timestamp_seconds: now_seconds(),
            },
        );
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn size(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> CanonicalResponse {
        CanonicalResponse {
            text: "hello".to_string(),
            input_tokens: 1,
            output_tokens: 1,
            model: "gpt-4o-mini".to_string(),
            provider: "openai".to_string(),
        }
    }

    #[tokio::test]
    async fn lookup_misses_on_empty_cache() {
        let cache = PromptCache::new(60);
        assert!(cache.lookup("openai", "hi").await.is_none());
    }

    #[tokio::test]
    async fn store_then_lookup_hits() {
        let cache = PromptCache::new(60);
        cache.store("openai", "hi", response()).await;
        assert_eq!(cache.lookup("openai", "hi").await, Some(response()));
    }

    #[tokio::test]
    async fn expired_entry_is_evicted_on_lookup() {
        let cache = PromptCache::new(0);
        cache.store("openai", "hi", response()).await;
        assert!(cache.lookup("openai", "hi").await.is_none());
        assert_eq!(cache.size().await, 0);
    }

    #[tokio::test]
    async fn clear_removes_all_entries() {
        let cache = PromptCache::new(60);
        cache.store("openai", "hi", response()).await;
        cache.clear().await;
        assert_eq!(cache.size().await, 0);
    }
}
