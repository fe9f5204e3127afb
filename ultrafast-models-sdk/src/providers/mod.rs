//! Provider adapter layer.
//!
//! Each provider translates a [`CanonicalRequest`] into its own wire format,
//! calls out over HTTP, and translates the reply back to a
//! [`CanonicalResponse`]. The dispatcher never sees provider-specific shapes;
//! it only sees [`ProviderAdapter::call`] and the tagged [`ProviderError`].

pub mod anthropic;
pub mod cohere;
pub mod gemini;
pub mod http_client;
pub mod mistral;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::models::{CanonicalRequest, CanonicalResponse, ProviderId};

/// Static configuration for one provider.
///
/// Read-only after construction. A provider is enabled iff its config is
/// present in the registry and `endpoint` is non-empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
}

impl ProviderConfig {
    pub fn is_enabled(&self) -> bool {
        !self.endpoint.is_empty()
    }
}

/// A single provider's capability: turn a canonical request into a
/// canonical response, or a tagged failure.
///
/// `system_prompt` is threaded in separately from [`CanonicalRequest`]
/// because it is admin-mutable shared state, not part of the immutable
/// per-call request; every adapter injects it as a system turn (or, for
/// Cohere, as both a `chat_history` entry and a `preamble`).
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn id(&self) -> ProviderId;

    async fn call(
        &self,
        request: &CanonicalRequest,
        system_prompt: &str,
    ) -> Result<CanonicalResponse, ProviderError>;
}

/// Builds the adapter for a provider id from its configuration.
///
/// Returns `None` when the config is missing or disabled; callers should
/// treat that the same as "not registered" rather than an error.
pub fn build_adapter(
    id: ProviderId,
    config: &ProviderConfig,
) -> Option<Box<dyn ProviderAdapter>> {
    if !config.is_enabled() {
        return None;
    }
    let adapter: Box<dyn ProviderAdapter> = match id {
        ProviderId::Openai => Box::new(openai::OpenaiAdapter::new(config.clone())),
        ProviderId::Anthropic => Box::new(anthropic::AnthropicAdapter::new(config.clone())),
        ProviderId::Gemini => Box::new(gemini::GeminiAdapter::new(config.clone())),
        ProviderId::Ollama => Box::new(ollama::OllamaAdapter::new(config.clone())),
        ProviderId::Mistral => Box::new(mistral::MistralAdapter::new(config.clone())),
        ProviderId::Cohere => Box::new(cohere::CohereAdapter::new(config.clone())),
    };
    Some(adapter)
}

/// A registry of the adapters that are actually enabled, keyed by id and
/// iterable in the deterministic lexicographic order the dispatcher's
/// failover loop relies on.
#[derive(Default)]
pub struct ProviderRegistry {
    adapters: Vec<Box<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn from_configs(
        configs: &std::collections::HashMap<ProviderId, ProviderConfig>,
    ) -> Self {
        let mut adapters = Vec::new();
        for id in ProviderId::ALL {
            if let Some(config) = configs.get(&id) {
                if let Some(adapter) = build_adapter(id, config) {
                    adapters.push(adapter);
                }
            }
        }
        Self { adapters }
    }

    pub fn get(&self, id: ProviderId) -> Option<&dyn ProviderAdapter> {
        self.adapters
            .iter()
            .find(|a| a.id() == id)
            .map(|a| a.as_ref())
    }

    pub fn is_enabled(&self, id: ProviderId) -> bool {
        self.get(id).is_some()
    }

    /// Enabled provider ids in lexicographic order, excluding `primary`.
    ///
    /// This is the order the dispatcher walks when the primary provider's
    /// call fails with an error that triggers failover. Sorted explicitly
    /// by wire id rather than relying on registration order, since
    /// `from_configs` registers adapters in [`ProviderId::ALL`]'s
    /// declaration order, which is not alphabetical.
    pub fn failover_order(&self, primary: ProviderId) -> Vec<ProviderId> {
        let mut ids: Vec<ProviderId> = self
            .adapters
            .iter()
            .map(|a| a.id())
            .filter(|id| *id != primary)
            .collect();
        ids.sort_by_key(|id| id.as_str());
        ids
    }

    pub fn enabled_count(&self) -> usize {
        self.adapters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(endpoint: &str) -> ProviderConfig {
        ProviderConfig {
            endpoint: endpoint.to_string(),
            api_key: "key".to_string(),
            model: "model".to_string(),
        }
    }

    #[test]
    fn disabled_provider_has_no_adapter() {
        let empty = ProviderConfig::default();
        assert!(build_adapter(ProviderId::Openai, &empty).is_none());
    }

    #[test]
    fn failover_order_is_lexicographic_and_excludes_primary() {
        let mut configs = HashMap::new();
        configs.insert(ProviderId::Mistral, config("https://mistral.example"));
        configs.insert(ProviderId::Openai, config("https://openai.example"));
        configs.insert(ProviderId::Anthropic, config("https://anthropic.example"));

        let registry = ProviderRegistry::from_configs(&configs);
        assert_eq!(registry.enabled_count(), 3);

        let order = registry.failover_order(ProviderId::Openai);
        assert_eq!(order, vec![ProviderId::Anthropic, ProviderId::Mistral]);
    }

    #[test]
    fn failover_order_does_not_follow_provider_id_all_declaration_order() {
        // ProviderId::ALL declares Openai, Gemini, Ollama in that order,
        // which is not alphabetical; the registry must sort explicitly
        // rather than rely on registration order matching it.
        let mut configs = HashMap::new();
        configs.insert(ProviderId::Openai, config("https://openai.example"));
        configs.insert(ProviderId::Gemini, config("https://gemini.example"));
        configs.insert(ProviderId::Ollama, config("https://ollama.example"));

        let registry = ProviderRegistry::from_configs(&configs);
        let order = registry.failover_order(ProviderId::Gemini);
        assert_eq!(order, vec![ProviderId::Ollama, ProviderId::Openai]);
    }
}
