//! Cohere adapter.
//!
//! Cohere is the one provider that carries the system prompt twice: once
//! as a `SYSTEM` turn in `chat_history` (falling back to the literal
//! string `"test"` rather than an empty string when no system prompt is
//! configured — kept verbatim rather than smoothed over) and again as a
//! separate `preamble` field carrying a fixed onboarding string
//! unrelated to the admin-configured system prompt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::{AuthStrategy, HttpProviderClient};
use super::{ProviderAdapter, ProviderConfig};
use crate::error::ProviderError;
use crate::models::{CanonicalRequest, CanonicalResponse, ProviderId};

/// Placeholder `SYSTEM` turn used when no system prompt has been configured.
const DEFAULT_SYSTEM_TURN: &str = "test";
/// Fixed preamble sent on every Cohere call, independent of `system_prompt`.
const FIXED_PREAMBLE: &str = "You are a helpful assistant.";

#[derive(Serialize)]
struct HistoryTurn<'a> {
    role: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct CohereRequest<'a> {
    model: &'a str,
    message: &'a str,
    chat_history: Vec<HistoryTurn<'a>>,
    preamble: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize, Default)]
struct BilledUnits {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Deserialize, Default)]
struct Tokens {
    #[serde(default)]
    input_tokens: u32,
}

#[derive(Deserialize, Default)]
struct Meta {
    #[serde(default)]
    tokens: Tokens,
    #[serde(default)]
    billed_units: BilledUnits,
}

#[derive(Deserialize)]
struct CohereResponse {
    text: String,
    #[serde(default)]
    meta: Meta,
}

pub struct CohereAdapter {
    http: Result<HttpProviderClient, ProviderError>,
    config: ProviderConfig,
}

impl CohereAdapter {
    pub fn new(config: ProviderConfig) -> Self {
        let http = if config.api_key.is_empty() {
            Err(ProviderError::Configuration {
                message: "cohere api key is empty".to_string(),
            })
        } else {
            HttpProviderClient::new(
                &config.endpoint,
                AuthStrategy::Bearer {
                    token: config.api_key.clone(),
                },
                &[
                    ("Content-Type", "application/json"),
                    ("Accept", "application/json"),
                ],
            )
        };
        Self { http, config }
    }
}

#[async_trait]
impl ProviderAdapter for CohereAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Cohere
    }

    async fn call(
        &self,
        request: &CanonicalRequest,
        system_prompt: &str,
    ) -> Result<CanonicalResponse, ProviderError> {
        let http = self.http.as_ref().map_err(Clone::clone)?;

        let system_turn = if system_prompt.is_empty() {
            DEFAULT_SYSTEM_TURN
        } else {
            system_prompt
        };

        let body = CohereRequest {
            model: &self.config.model,
            message: &request.prompt,
            chat_history: vec![HistoryTurn {
                role: "SYSTEM",
                message: system_turn,
            }],
            preamble: FIXED_PREAMBLE,
            temperature: request.temperature_or_default(),
            max_tokens: request.max_tokens_or_default(),
        };

        let response: CohereResponse = http.post_json("/v1/chat", &body).await?;

        Ok(CanonicalResponse {
            text: response.text,
            input_tokens: response.meta.tokens.input_tokens,
            output_tokens: response.meta.billed_units.output_tokens,
            model: self.config.model.clone(),
            provider: ProviderId::Cohere.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_turn_falls_back_to_literal_test_when_empty() {
        let turn = if "".is_empty() {
            DEFAULT_SYSTEM_TURN
        } else {
            ""
        };
        assert_eq!(turn, "test");
    }
}
