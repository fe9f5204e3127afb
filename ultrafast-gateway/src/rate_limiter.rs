//! # Rate Limiter
//!
//! A per-client-IP fixed-window admission counter governed by a single
//! active [`RateLimitPlan`]. Replacing the plan drops every per-IP
//! counter, since a counter's meaning (requests against what window) is
//! tied to the plan that produced it.

use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::analytics::RateLimitPlan;

struct RateLimitState {
    requests: u32,
    window_start: u64,
}

pub struct AdmitResult {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_seconds: u64,
}

pub struct RateLimiter {
    plan: RwLock<Option<RateLimitPlan>>,
    states: DashMap<String, RateLimitState>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self {
            plan: RwLock::new(None),
            states: DashMap::new(),
        }
    }
}

impl RateLimiter {
    pub fn new(plan: Option<RateLimitPlan>) -> Self {
        Self {
            plan: RwLock::new(plan),
            states: DashMap::new(),
        }
    }

    pub async fn set_plan(&self, plan: Option<RateLimitPlan>) {
        let mut current = self.plan.write().await;
        *current = plan;
        self.states.clear();
    }

    pub async fn get_plan(&self) -> Option<RateLimitPlan> {
        self.plan.read().await.clone()
    }

    pub async fn admit(&self, ip: &str, now: u64) -> AdmitResult {
        let Some(plan) = self.plan.read().await.clone() else {
            return AdmitResult {
                allowed: true,
                limit: 0,
                remaining: 0,
                reset_seconds: 0,
            };
        };

        let mut state = self
            .states
            .entry(ip.to_string())
            .or_insert_with(|| RateLimitState {
                requests: 0,
                window_start: now,
            });

        if now.saturating_sub(state.window_start) >= plan.window_seconds {
            state.requests = 0;
            state.window_start = now;
        }

        let remaining = plan.requests_per_window.saturating_sub(state.requests);
        let reset_seconds = plan
            .window_seconds
            .saturating_sub(now.saturating_sub(state.window_start));

        if state.requests >= plan.requests_per_window {
            return AdmitResult {
                allowed: false,
                limit: plan.requests_per_window,
                remaining,
                reset_seconds,
            };
        }

        state.requests += 1;
        AdmitResult {
            allowed: true,
            limit: plan.requests_per_window,
            remaining: remaining - 1,
            reset_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(requests_per_window: u32, window_seconds: u64) -> RateLimitPlan {
        RateLimitPlan {
            name: "test".to_string(),
            requests_per_window,
            window_seconds,
        }
    }

    #[tokio::test]
    async fn no_plan_always_admits() {
        let limiter = RateLimiter::default();
        let result = limiter.admit("1.2.3.4", 0).await;
        assert!(result.allowed);
        assert_eq!(result.limit, 0);
    }

    #[tokio::test]
    async fn admits_up_to_the_window_limit_then_denies() {
        let limiter = RateLimiter::new(Some(plan(2, 60)));
        assert!(limiter.admit("1.2.3.4", 0).await.allowed);
        assert!(limiter.admit("1.2.3.4", 0).await.allowed);
        let third = limiter.admit("1.2.3.4", 0).await;
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);
    }

    #[tokio::test]
    async fn window_rollover_resets_the_counter() {
        let limiter = RateLimiter::new(Some(plan(1, 10)));
        assert!(limiter.admit("1.2.3.4", 0).await.allowed);
        assert!(!limiter.admit("1.2.3.4", 5).await.allowed);
        assert!(limiter.admit("1.2.3.4", 11).await.allowed);
    }

    #[tokio::test]
    async fn changing_the_plan_drops_existing_counters() {
        let limiter = RateLimiter::new(Some(plan(1, 60)));
        assert!(limiter.admit("1.2.3.4", 0).await.allowed);
        assert!(!limiter.admit("1.2.3.4", 0).await.allowed);

        limiter.set_plan(Some(plan(1, 60))).await;
        assert!(limiter.admit("1.2.3.4", 0).await.allowed);
    }
}
