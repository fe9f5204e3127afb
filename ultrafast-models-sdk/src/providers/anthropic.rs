//! Anthropic messages adapter.
//!
//! Anthropic's wire format puts the system prompt in a top-level `system`
//! field rather than as a message turn, and requires the
//! `anthropic-version` header on every request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::{AuthStrategy, HttpProviderClient};
use super::{ProviderAdapter, ProviderConfig};
use crate::error::ProviderError;
use crate::models::{CanonicalRequest, CanonicalResponse, ProviderId};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Usage,
}

pub struct AnthropicAdapter {
    http: Result<HttpProviderClient, ProviderError>,
    config: ProviderConfig,
}

impl AnthropicAdapter {
    pub fn new(config: ProviderConfig) -> Self {
        let http = if config.api_key.is_empty() {
            Err(ProviderError::Configuration {
                message: "anthropic api key is empty".to_string(),
            })
        } else {
            HttpProviderClient::new(
                &config.endpoint,
                AuthStrategy::Bearer {
                    token: config.api_key.clone(),
                },
                &[("anthropic-version", ANTHROPIC_VERSION)],
            )
        };
        Self { http, config }
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    async fn call(
        &self,
        request: &CanonicalRequest,
        system_prompt: &str,
    ) -> Result<CanonicalResponse, ProviderError> {
        let http = self.http.as_ref().map_err(Clone::clone)?;

        let body = MessagesRequest {
            model: &self.config.model,
            system: system_prompt,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature_or_default(),
            max_tokens: request.max_tokens_or_default(),
        };

        let response: MessagesResponse = http.post_json("/v1/messages", &body).await?;
        let block = response
            .content
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode {
                message: "response had no content blocks".to_string(),
            })?;

        Ok(CanonicalResponse {
            text: block.text,
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
            model: self.config.model.clone(),
            provider: ProviderId::Anthropic.to_string(),
        })
    }
}
