//! Ollama adapter.
//!
//! Local/self-hosted, so no API key and no auth header; the request always
//! sets `stream: false` since streaming is out of scope.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::{AuthStrategy, HttpProviderClient};
use super::{ProviderAdapter, ProviderConfig};
use crate::error::ProviderError;
use crate::models::{CanonicalRequest, CanonicalResponse, ProviderId};

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaResponseMessage,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

pub struct OllamaAdapter {
    http: Result<HttpProviderClient, ProviderError>,
    config: ProviderConfig,
}

impl OllamaAdapter {
    pub fn new(config: ProviderConfig) -> Self {
        let http = HttpProviderClient::new(&config.endpoint, AuthStrategy::None, &[]);
        Self { http, config }
    }
}

#[async_trait]
impl ProviderAdapter for OllamaAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Ollama
    }

    async fn call(
        &self,
        request: &CanonicalRequest,
        system_prompt: &str,
    ) -> Result<CanonicalResponse, ProviderError> {
        let http = self.http.as_ref().map_err(Clone::clone)?;

        let mut messages = Vec::with_capacity(2);
        if !system_prompt.is_empty() {
            messages.push(OllamaMessage {
                role: "system",
                content: system_prompt,
            });
        }
        messages.push(OllamaMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = OllamaRequest {
            model: &self.config.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature_or_default(),
                num_predict: request.max_tokens_or_default(),
            },
        };

        let response: OllamaResponse = http.post_json("/api/chat", &body).await?;

        Ok(CanonicalResponse {
            text: response.message.content,
            input_tokens: response.prompt_eval_count,
            output_tokens: response.eval_count,
            model: self.config.model.clone(),
            provider: ProviderId::Ollama.to_string(),
        })
    }
}
