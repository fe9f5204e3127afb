//! # Dispatcher / Failover Controller
//!
//! Runs one request through the fixed pipeline order: rate check, cache
//! lookup, provider dispatch with failover, bookkeeping, cache store,
//! respond. Every step after rate-check executes under a single request
//! id so a request's log records can be correlated end to end.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use ultrafast_models_sdk::guardrails::{self, GuardrailConfig};
use ultrafast_models_sdk::providers::ProviderRegistry;
use ultrafast_models_sdk::{
    CanonicalRequest, CanonicalResponse, ProviderAdapter, ProviderError, ProviderId,
};

use crate::admin::AdminState;
use crate::analytics::AnalyticsAggregator;
use crate::cache::PromptCache;
use crate::logger::{LogLevel, StructuredLogger};
use crate::rate_limiter::{AdmitResult, RateLimiter};

pub struct Dispatcher {
    registry: Arc<ProviderRegistry>,
    cache: Arc<PromptCache>,
    rate_limiter: Arc<RateLimiter>,
    analytics: Arc<AnalyticsAggregator>,
    admin: Arc<AdminState>,
}

pub enum DispatchOutcome {
    Success {
        response: CanonicalResponse,
        admission: AdmitResult,
    },
    RateLimited(AdmitResult),
    Failed(ProviderError),
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        cache: Arc<PromptCache>,
        rate_limiter: Arc<RateLimiter>,
        analytics: Arc<AnalyticsAggregator>,
        admin: Arc<AdminState>,
    ) -> Self {
        Self {
            registry,
            cache,
            rate_limiter,
            analytics,
            admin,
        }
    }

    pub async fn dispatch(
        &self,
        primary: ProviderId,
        client_ip: &str,
        request: &CanonicalRequest,
        logger: &StructuredLogger,
    ) -> DispatchOutcome {
        let request_id = Uuid::new_v4();
        let now = now_seconds();

        // RATE_CHECK
        let admission = self.rate_limiter.admit(client_ip, now).await;
        if !admission.allowed {
            log_event(logger, request_id, "rate_check", "request denied by rate limiter");
            return DispatchOutcome::RateLimited(admission);
        }

        // CACHE_LOOKUP
        if let Some(cached) = self.cache.lookup(primary.as_str(), &request.prompt).await {
            log_event(logger, request_id, "cache_lookup", "cache hit");
            self.analytics
                .record_cache_hit(primary, (cached.input_tokens, cached.output_tokens))
                .await;
            return DispatchOutcome::Success {
                response: cached,
                admission,
            };
        }
        log_event(logger, request_id, "cache_lookup", "cache miss");

        // DISPATCH (with failover)
        let system_prompt = self.admin.system_prompt();
        let guardrails = self.admin.guardrails();

        let result = self
            .try_provider(primary, request, &system_prompt, &guardrails, logger, request_id)
            .await;

        let (served_by, outcome) = match result {
            Ok(response) => (primary, Ok(response)),
            Err(first_error) => {
                if !first_error.triggers_failover() || self.registry.enabled_count() < 2 {
                    (primary, Err(first_error))
                } else {
                    self.failover(
                        primary,
                        request,
                        &system_prompt,
                        &guardrails,
                        logger,
                        request_id,
                        first_error,
                    )
                    .await
                }
            }
        };

        match outcome {
            Ok(response) => {
                log_event(logger, request_id, "dispatch", "provider call succeeded");
                self.analytics
                    .record_provider_success(served_by, (response.input_tokens, response.output_tokens))
                    .await;
                self.cache
                    .store(primary.as_str(), &request.prompt, response.clone())
                    .await;
                DispatchOutcome::Success {
                    response,
                    admission,
                }
            }
            Err(last_error) => {
                log_event(logger, request_id, "dispatch", &format!("all providers failed: {last_error}"));
                self.analytics
                    .record_failure(primary, error_type_name(&last_error), last_error.to_string())
                    .await;
                DispatchOutcome::Failed(last_error)
            }
        }
    }

    async fn failover(
        &self,
        primary: ProviderId,
        request: &CanonicalRequest,
        system_prompt: &str,
        guardrails: &GuardrailConfig,
        logger: &StructuredLogger,
        request_id: Uuid,
        first_error: ProviderError,
    ) -> (ProviderId, Result<CanonicalResponse, ProviderError>) {
        let mut last_error = first_error;
        for candidate in self.registry.failover_order(primary) {
            log_event(
                logger,
                request_id,
                "dispatch",
                &format!("failing over to {candidate}"),
            );
            match self
                .try_provider(candidate, request, system_prompt, guardrails, logger, request_id)
                .await
            {
                Ok(response) => return (candidate, Ok(response)),
                Err(err) => {
                    let should_continue = err.triggers_failover();
                    last_error = err;
                    if !should_continue {
                        return (candidate, Err(last_error));
                    }
                }
            }
        }
        (primary, Err(last_error))
    }

    async fn try_provider(
        &self,
        id: ProviderId,
        request: &CanonicalRequest,
        system_prompt: &str,
        guardrails: &GuardrailConfig,
        logger: &StructuredLogger,
        request_id: Uuid,
    ) -> Result<CanonicalResponse, ProviderError> {
        let Some(adapter) = self.registry.get(id) else {
            return Err(ProviderError::Configuration {
                message: format!("provider {id} is not enabled"),
            });
        };

        let response = self.call_adapter(adapter, request, system_prompt).await?;
        let filtered_text = guardrails::filter(&response.text, guardrails)?;

        log_event(logger, request_id, "dispatch", &format!("{id} responded"));

        Ok(CanonicalResponse {
            text: filtered_text,
            ..response
        })
    }

    async fn call_adapter(
        &self,
        adapter: &dyn ProviderAdapter,
        request: &CanonicalRequest,
        system_prompt: &str,
    ) -> Result<CanonicalResponse, ProviderError> {
        adapter.call(request, system_prompt).await
    }
}

fn error_type_name(error: &ProviderError) -> &'static str {
    match error {
        ProviderError::Configuration { .. } => "configuration",
        ProviderError::Transport { .. } => "transport",
        ProviderError::Decode { .. } => "decode",
        ProviderError::Guardrail { .. } => "guardrail",
        ProviderError::Cancelled => "cancelled",
        ProviderError::Timeout => "timeout",
    }
}

fn now_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_secs()
}

fn log_event(logger: &StructuredLogger, request_id: Uuid, component: &str, message: &str) {
    let mut metadata = HashMap::new();
    metadata.insert("requestId".to_string(), request_id.to_string());
    logger.log(LogLevel::Info, component, message, &metadata);
}
