//! OpenAI chat-completions adapter.
//!
//! Wire format is the OpenAI `/v1/chat/completions` shape; Mistral speaks
//! the same shape against a different base URL, see [`super::mistral`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::{AuthStrategy, HttpProviderClient};
use super::{ProviderAdapter, ProviderConfig};
use crate::error::ProviderError;
use crate::models::{CanonicalRequest, CanonicalResponse, ProviderId};

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

fn build_messages<'a>(system_prompt: &'a str, prompt: &'a str) -> Vec<ChatMessage<'a>> {
    let mut messages = Vec::with_capacity(2);
    if !system_prompt.is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: system_prompt,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: prompt,
    });
    messages
}

#[derive(Deserialize)]
struct ChatResponseChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatResponseChoice>,
    #[serde(default)]
    usage: ChatUsage,
}

pub struct OpenaiAdapter {
    http: Result<HttpProviderClient, ProviderError>,
    config: ProviderConfig,
}

impl OpenaiAdapter {
    pub fn new(config: ProviderConfig) -> Self {
        let http = if config.api_key.is_empty() {
            Err(ProviderError::Configuration {
                message: "openai api key is empty".to_string(),
            })
        } else {
            HttpProviderClient::new(
                &config.endpoint,
                AuthStrategy::Bearer {
                    token: config.api_key.clone(),
                },
                &[],
            )
        };
        Self { http, config }
    }
}

#[async_trait]
impl ProviderAdapter for OpenaiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Openai
    }

    async fn call(
        &self,
        request: &CanonicalRequest,
        system_prompt: &str,
    ) -> Result<CanonicalResponse, ProviderError> {
        call_openai_compatible(
            self.http.as_ref().map_err(Clone::clone)?,
            &self.config,
            request,
            system_prompt,
            "/v1/chat/completions",
            ProviderId::Openai,
        )
        .await
    }
}

/// Shared implementation for the OpenAI-shaped providers (OpenAI, Mistral).
pub(super) async fn call_openai_compatible(
    http: &HttpProviderClient,
    config: &ProviderConfig,
    request: &CanonicalRequest,
    system_prompt: &str,
    path: &str,
    id: ProviderId,
) -> Result<CanonicalResponse, ProviderError> {
    let body = ChatRequest {
        model: &config.model,
        messages: build_messages(system_prompt, &request.prompt),
        temperature: request.temperature_or_default(),
        max_tokens: request.max_tokens_or_default(),
    };

    let response: ChatResponse = http.post_json(path, &body).await?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Decode {
            message: "response had no choices".to_string(),
        })?;

    Ok(CanonicalResponse {
        text: choice.message.content,
        input_tokens: response.usage.prompt_tokens,
        output_tokens: response.usage.completion_tokens,
        model: config.model.clone(),
        provider: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected_at_construction() {
        let config = ProviderConfig {
            endpoint: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
        };
        let adapter = OpenaiAdapter::new(config);
        assert!(matches!(
            adapter.http,
            Err(ProviderError::Configuration { .. })
        ));
    }
}
