//! Mistral adapter.
//!
//! Mistral speaks the same OpenAI-compatible chat-completions shape as
//! OpenAI itself, just against a different base URL; the request/response
//! translation is shared with [`super::openai`].

use async_trait::async_trait;

use super::http_client::{AuthStrategy, HttpProviderClient};
use super::openai::call_openai_compatible;
use super::{ProviderAdapter, ProviderConfig};
use crate::error::ProviderError;
use crate::models::{CanonicalRequest, CanonicalResponse, ProviderId};

pub struct MistralAdapter {
    http: Result<HttpProviderClient, ProviderError>,
    config: ProviderConfig,
}

impl MistralAdapter {
    pub fn new(config: ProviderConfig) -> Self {
        let http = if config.api_key.is_empty() {
            Err(ProviderError::Configuration {
                message: "mistral api key is empty".to_string(),
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
impl ProviderAdapter for MistralAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Mistral
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
            ProviderId::Mistral,
        )
        .await
    }
}
