//! # Admin State Surface
//!
//! The handful of values an operator can change while the gateway is
//! running: system prompt, guardrails, the active rate-limit plan,
//! logging config, and the verbose-logging flag. The dispatcher reads a
//! consistent snapshot of all of them once per request; writers replace
//! the whole snapshot atomically rather than mutating fields in place, so
//! a reader never observes half of one update and half of another.
//!
//! The control-plane HTTP listener that would expose these as a second
//! Axum server is not implemented here — only the state transitions it
//! would drive.

use std::sync::Arc;

use arc_swap::ArcSwap;
use ultrafast_models_sdk::guardrails::GuardrailConfig;

use crate::analytics::{AnalyticsAggregator, RateLimitPlan, Stats};
use crate::cache::PromptCache;
use crate::logger::LoggingConfig;
use crate::rate_limiter::RateLimiter;

#[derive(Clone)]
struct AdminSnapshot {
    system_prompt: Arc<String>,
    guardrails: Arc<GuardrailConfig>,
    logging_config: Arc<LoggingConfig>,
    verbose_logging: bool,
}

/// Owns the admin-mutable values plus the collaborators whose state an
/// admin action also touches (the cache to flush, the rate limiter whose
/// plan to swap).
pub struct AdminState {
    snapshot: ArcSwap<AdminSnapshot>,
    cache: Arc<PromptCache>,
    rate_limiter: Arc<RateLimiter>,
    analytics: Arc<AnalyticsAggregator>,
}

impl AdminState {
    pub fn new(
        system_prompt: String,
        guardrails: GuardrailConfig,
        logging_config: LoggingConfig,
        verbose_logging: bool,
        cache: Arc<PromptCache>,
        rate_limiter: Arc<RateLimiter>,
        analytics: Arc<AnalyticsAggregator>,
    ) -> Self {
        let snapshot = AdminSnapshot {
            system_prompt: Arc::new(system_prompt),
            guardrails: Arc::new(guardrails),
            logging_config: Arc::new(logging_config),
            verbose_logging,
        };
        Self {
            snapshot: ArcSwap::from_pointee(snapshot),
            cache,
            rate_limiter,
            analytics,
        }
    }

    pub fn system_prompt(&self) -> Arc<String> {
        self.snapshot.load().system_prompt.clone()
    }

    pub fn set_system_prompt(&self, value: String) {
        self.snapshot.rcu(|current| {
            let mut next = (**current).clone();
            next.system_prompt = Arc::new(value.clone());
            next
        });
    }

    pub fn guardrails(&self) -> Arc<GuardrailConfig> {
        self.snapshot.load().guardrails.clone()
    }

    pub fn set_guardrails(&self, value: GuardrailConfig) {
        self.snapshot.rcu(|current| {
            let mut next = (**current).clone();
            next.guardrails = Arc::new(value.clone());
            next
        });
    }

    pub fn verbose_logging(&self) -> bool {
        self.snapshot.load().verbose_logging
    }

    pub fn set_verbose_logging(&self, value: bool) {
        self.snapshot.rcu(|current| {
            let mut next = (**current).clone();
            next.verbose_logging = value;
            next
        });
    }

    pub fn logging_config(&self) -> Arc<LoggingConfig> {
        self.snapshot.load().logging_config.clone()
    }

    pub fn set_logging_config(&self, value: LoggingConfig) {
        self.snapshot.rcu(|current| {
            let mut next = (**current).clone();
            next.logging_config = Arc::new(value.clone());
            next
        });
    }

    pub async fn get_rate_limit_plan(&self) -> Option<RateLimitPlan> {
        self.rate_limiter.get_plan().await
    }

    pub async fn set_rate_limit_plan(&self, plan: Option<RateLimitPlan>) {
        self.rate_limiter.set_plan(plan).await;
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn cache_size(&self) -> usize {
        self.cache.size().await
    }

    pub async fn snapshot_stats(&self) -> Stats {
        self.analytics.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_state() -> AdminState {
        AdminState::new(
            String::new(),
            GuardrailConfig::default(),
            LoggingConfig::default(),
            false,
            Arc::new(PromptCache::new(60)),
            Arc::new(RateLimiter::default()),
            Arc::new(AnalyticsAggregator::new()),
        )
    }

    #[test]
    fn set_system_prompt_is_visible_to_subsequent_readers() {
        let admin = admin_state();
        admin.set_system_prompt("be concise".to_string());
        assert_eq!(*admin.system_prompt(), "be concise");
    }

    #[test]
    fn updating_one_field_does_not_disturb_another() {
        let admin = admin_state();
        admin.set_system_prompt("be concise".to_string());
        admin.set_verbose_logging(true);
        assert_eq!(*admin.system_prompt(), "be concise");
        assert!(admin.verbose_logging());
    }

    #[tokio::test]
    async fn clear_cache_empties_the_prompt_cache() {
        let admin = admin_state();
        admin
            .cache
            .store(
                "openai",
                "hi",
                ultrafast_models_sdk::CanonicalResponse {
                    text: "hello".to_string(),
                    input_tokens: 1,
                    output_tokens: 1,
                    model: "gpt-4o-mini".to_string(),
                    provider: "openai".to_string(),
                },
            )
            .await;
        admin.clear_cache().await;
        assert_eq!(admin.cache_size().await, 0);
    }
}
