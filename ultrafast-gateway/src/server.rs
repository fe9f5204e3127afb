//! # HTTP Server
//!
//! Wires the configured providers, cache, rate limiter, analytics, and
//! admin state into a [`Dispatcher`] and exposes it behind the data-plane
//! router. The control-plane listener that would let an operator drive
//! [`AdminState`] over HTTP is not implemented here.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use ultrafast_models_sdk::providers::ProviderRegistry;

use crate::admin::AdminState;
use crate::analytics::AnalyticsAggregator;
use crate::cache::PromptCache;
use crate::config::GatewayConfig;
use crate::dispatcher::Dispatcher;
use crate::handlers;
use crate::logger::LoggingConfig;
use crate::rate_limiter::RateLimiter;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    pub rate_limiter: Arc<RateLimiter>,
    pub admin: Arc<AdminState>,
    pub dispatcher: Arc<Dispatcher>,
}

pub fn create_server(config: GatewayConfig) -> Router {
    let registry = Arc::new(ProviderRegistry::from_configs(&config.typed_providers()));
    let cache = Arc::new(PromptCache::new(config.cache_ttl_seconds));
    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit_plan.clone()));
    let analytics = Arc::new(AnalyticsAggregator::new());
    let admin = Arc::new(AdminState::new(
        config.system_prompt.clone(),
        config.guardrails.clone(),
        LoggingConfig::default(),
        config.verbose_logging,
        cache.clone(),
        rate_limiter.clone(),
        analytics.clone(),
    ));
    let dispatcher = Arc::new(Dispatcher::new(
        registry,
        cache,
        rate_limiter.clone(),
        analytics,
        admin.clone(),
    ));

    let state = AppState {
        rate_limiter,
        admin,
        dispatcher,
    };

    Router::new()
        .route("/chat", post(handlers::chat))
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
        )
        .with_state(state)
}
