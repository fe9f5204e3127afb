//! # Configuration Management
//!
//! Loads the gateway's startup configuration from a TOML file, applies
//! environment variable overrides for provider API keys, and validates
//! the result before the server binds a socket.
//!
//! ## Environment Variables
//!
//! - `<PROVIDER>_API_KEY` (e.g. `OPENAI_API_KEY`) overrides the matching
//!   provider's configured key.
//! - `GATEWAY_PORT` overrides `server.port`.
//! - `GATEWAY_VERBOSE_LOGGING` overrides `verboseLogging`.

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};
use ultrafast_models_sdk::guardrails::GuardrailConfig;
use ultrafast_models_sdk::providers::ProviderConfig as SdkProviderConfig;
use ultrafast_models_sdk::ProviderId;

use crate::analytics::RateLimitPlan;

/// Top-level gateway configuration, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: HashMap<String, SdkProviderConfig>,
    #[serde(default)]
    pub cache_ttl_seconds: u64,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub guardrails: GuardrailConfig,
    #[serde(default)]
    pub rate_limit_plan: Option<RateLimitPlan>,
    #[serde(default)]
    pub verbose_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            providers: HashMap::new(),
            cache_ttl_seconds: 300,
            system_prompt: String::new(),
            guardrails: GuardrailConfig::default(),
            rate_limit_plan: None,
            verbose_logging: false,
        }
    }
}

impl GatewayConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: GatewayConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Overrides provider API keys from `<PROVIDER>_API_KEY` and a couple
    /// of top-level knobs from their matching `GATEWAY_*` variables.
    pub fn apply_env_overrides(&mut self) {
        for (name, provider) in self.providers.iter_mut() {
            let env_key = format!("{}_API_KEY", name.to_uppercase());
            if let Ok(api_key) = env::var(&env_key) {
                if !api_key.is_empty() {
                    provider.api_key = api_key;
                    tracing::debug!(provider = %name, "loaded API key from environment");
                }
            }
        }

        if let Ok(port_str) = env::var("GATEWAY_PORT") {
            if let Ok(port) = port_str.parse() {
                self.server.port = port;
            }
        }

        if let Ok(verbose) = env::var("GATEWAY_VERBOSE_LOGGING") {
            if let Ok(verbose) = verbose.parse() {
                self.verbose_logging = verbose;
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("server.port must be non-zero"));
        }

        let enabled_count = ProviderId::ALL
            .iter()
            .filter(|id| {
                self.providers
                    .get(id.as_str())
                    .is_some_and(SdkProviderConfig::is_enabled)
            })
            .count();
        if enabled_count == 0 {
            return Err(anyhow::anyhow!("at least one provider must be enabled"));
        }

        if !self.guardrails.is_valid() {
            return Err(anyhow::anyhow!(
                "guardrails.min_length must be <= guardrails.max_length"
            ));
        }

        Ok(())
    }

    /// Providers keyed by [`ProviderId`] rather than the raw config-file
    /// string key, as the rest of the gateway expects.
    pub fn typed_providers(&self) -> HashMap<ProviderId, SdkProviderConfig> {
        self.providers
            .iter()
            .filter_map(|(name, config)| {
                name.parse::<ProviderId>().ok().map(|id| (id, config.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_fails_validation_with_no_providers() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_requires_at_least_one_enabled_provider() {
        let mut config = GatewayConfig::default();
        config.providers.insert(
            "openai".to_string(),
            SdkProviderConfig {
                endpoint: "https://api.openai.com".to_string(),
                api_key: "key".to_string(),
                model: "gpt-4o-mini".to_string(),
            },
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_rejects_inverted_guardrail_bounds() {
        let mut config = GatewayConfig::default();
        config.providers.insert(
            "openai".to_string(),
            SdkProviderConfig {
                endpoint: "https://api.openai.com".to_string(),
                api_key: "key".to_string(),
                model: "gpt-4o-mini".to_string(),
            },
        );
        config.guardrails.min_length = 100;
        config.guardrails.max_length = 10;
        assert!(config.validate().is_err());
    }
}
