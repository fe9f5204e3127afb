//! Gemini adapter.
//!
//! Gemini has no system role, so the system prompt is folded in as a
//! leading `user` turn; authorization is an `x-goog-api-key` header
//! rather than `Authorization: Bearer`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::{AuthStrategy, HttpProviderClient};
use super::{ProviderAdapter, ProviderConfig};
use crate::error::ProviderError;
use crate::models::{CanonicalRequest, CanonicalResponse, ProviderId};

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct GeminiResponseChoice {
    message: GeminiResponseMessage,
}

#[derive(Deserialize)]
struct GeminiResponseMessage {
    content: String,
}

#[derive(Deserialize, Default)]
struct GeminiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    choices: Vec<GeminiResponseChoice>,
    #[serde(default)]
    usage: Option<GeminiUsage>,
}

pub struct GeminiAdapter {
    http: Result<HttpProviderClient, ProviderError>,
    config: ProviderConfig,
}

impl GeminiAdapter {
    pub fn new(config: ProviderConfig) -> Self {
        let http = if config.api_key.is_empty() {
            Err(ProviderError::Configuration {
                message: "gemini api key is empty".to_string(),
            })
        } else {
            HttpProviderClient::new(
                &config.endpoint,
                AuthStrategy::Header {
                    name: "x-goog-api-key".to_string(),
                    value: config.api_key.clone(),
                },
                &[],
            )
        };
        Self { http, config }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn call(
        &self,
        request: &CanonicalRequest,
        system_prompt: &str,
    ) -> Result<CanonicalResponse, ProviderError> {
        let http = self.http.as_ref().map_err(Clone::clone)?;

        let mut contents = Vec::with_capacity(2);
        if !system_prompt.is_empty() {
            contents.push(GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: system_prompt }],
            });
        }
        contents.push(GeminiContent {
            role: "user",
            parts: vec![GeminiPart {
                text: &request.prompt,
            }],
        });

        let body = GeminiRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: request.temperature_or_default(),
                max_output_tokens: request.max_tokens_or_default(),
            },
        };

        let path = format!("/models/{}:chatCompletions", self.config.model);
        let response: GeminiResponse = http.post_json(&path, &body).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode {
                message: "response had no choices".to_string(),
            })?;
        let usage = response.usage.unwrap_or_default();

        Ok(CanonicalResponse {
            text: choice.message.content,
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            model: self.config.model.clone(),
            provider: ProviderId::Gemini.to_string(),
        })
    }
}
