//! # Analytics Aggregator
//!
//! Process-wide, monotonically increasing request/token/error counters,
//! all mutated under one lock. Reads take a cloned snapshot rather than
//! holding the lock across a response, so a slow reader never blocks a
//! writer mid-request.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use ultrafast_models_sdk::ProviderId;

/// At most one of these is active process-wide; `None` disables the
/// rate limiter entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimitPlan {
    pub name: String,
    pub requests_per_window: u32,
    pub window_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub by_provider: HashMap<String, u64>,
    pub errors_by_provider: HashMap<String, u64>,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenStats {
    pub total_input: u64,
    pub total_output: u64,
    pub input_by_provider: HashMap<String, u64>,
    pub output_by_provider: HashMap<String, u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorStats {
    pub total: u64,
    pub by_type: HashMap<String, u64>,
    pub recent_errors: Vec<String>,
}

const RECENT_ERRORS_CAPACITY: usize = 10;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub request_stats: RequestStats,
    pub token_stats: TokenStats,
    pub error_stats: ErrorStats,
}

impl Stats {
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.request_stats.cache_hits + self.request_stats.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.request_stats.cache_hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
pub struct AnalyticsAggregator {
    stats: RwLock<Stats>,
}

impl AnalyticsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_cache_hit(&self, provider: ProviderId, response_tokens: (u32, u32)) {
        let mut stats = self.stats.write().await;
        stats.request_stats.total += 1;
        stats.request_stats.successful += 1;
        stats.request_stats.cache_hits += 1;
        *stats
            .request_stats
            .by_provider
            .entry(provider.to_string())
            .or_default() += 1;
        Self::record_tokens(&mut stats.token_stats, provider, response_tokens);
    }

    pub async fn record_provider_success(&self, provider: ProviderId, response_tokens: (u32, u32)) {
        let mut stats = self.stats.write().await;
        stats.request_stats.total += 1;
        stats.request_stats.successful += 1;
        stats.request_stats.cache_misses += 1;
        *stats
            .request_stats
            .by_provider
            .entry(provider.to_string())
            .or_default() += 1;
        Self::record_tokens(&mut stats.token_stats, provider, response_tokens);
    }

    /// Records the single terminal failure of a request: every provider in
    /// the failover chain was exhausted. `primary` is the provider the
    /// caller originally asked for, not necessarily the one whose error
    /// message is attached.
    pub async fn record_failure(&self, primary: ProviderId, error_type: &str, description: String) {
        let mut stats = self.stats.write().await;
        stats.request_stats.total += 1;
        stats.request_stats.failed += 1;
        stats.request_stats.cache_misses += 1;
        *stats
            .request_stats
            .errors_by_provider
            .entry(primary.to_string())
            .or_default() += 1;

        stats.error_stats.total += 1;
        *stats
            .error_stats
            .by_type
            .entry(error_type.to_string())
            .or_default() += 1;
        stats.error_stats.recent_errors.push(description);
        if stats.error_stats.recent_errors.len() > RECENT_ERRORS_CAPACITY {
            let overflow = stats.error_stats.recent_errors.len() - RECENT_ERRORS_CAPACITY;
            stats.error_stats.recent_errors.drain(0..overflow);
        }
    }

    fn record_tokens(token_stats: &mut TokenStats, provider: ProviderId, tokens: (u32, u32)) {
        let (input, output) = tokens;
        token_stats.total_input += input as u64;
        token_stats.total_output += output as u64;
        *token_stats
            .input_by_provider
            .entry(provider.to_string())
            .or_default() += input as u64;
        *token_stats
            .output_by_provider
            .entry(provider.to_string())
            .or_default() += output as u64;
    }

    pub async fn snapshot(&self) -> Stats {
        self.stats.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cache_hit_increments_total_successful_and_cache_hits() {
        let analytics = AnalyticsAggregator::new();
        analytics
            .record_cache_hit(ProviderId::Openai, (10, 20))
            .await;
        let stats = analytics.snapshot().await;
        assert_eq!(stats.request_stats.total, 1);
        assert_eq!(stats.request_stats.successful, 1);
        assert_eq!(stats.request_stats.cache_hits, 1);
        assert_eq!(stats.token_stats.total_input, 10);
        assert_eq!(stats.token_stats.total_output, 20);
    }

    #[tokio::test]
    async fn recent_errors_is_bounded_to_ten() {
        let analytics = AnalyticsAggregator::new();
        for i in 0..15 {
            analytics
                .record_failure(ProviderId::Openai, "transport", format!("error {i}"))
                .await;
        }
        let stats = analytics.snapshot().await;
        assert_eq!(stats.error_stats.recent_errors.len(), 10);
        assert_eq!(stats.error_stats.recent_errors[0], "error 5");
        assert_eq!(stats.error_stats.total, 15);
    }
}
