//! Shared HTTP plumbing for provider adapters.
//!
//! Every adapter builds one of these at construction time and reuses it for
//! every call; nothing here is request-specific beyond the path and body.

use std::time::Duration;

use reqwest::{header::HeaderMap, Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProviderError;

/// Deadline applied to every outbound provider call. Elapsing this maps to
/// [`ProviderError::Timeout`], which the dispatcher treats as failover-worthy.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub enum AuthStrategy {
    Bearer { token: String },
    Header { name: String, value: String },
    None,
}

#[derive(Clone)]
pub struct HttpProviderClient {
    http: Client,
    base_url: String,
    default_headers: HeaderMap,
}

impl HttpProviderClient {
    pub fn new(
        base_url: &str,
        auth: AuthStrategy,
        extra_headers: &[(&str, &str)],
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Configuration {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        let mut default_headers = HeaderMap::new();
        match auth {
            AuthStrategy::Bearer { token } => {
                let value = format!("Bearer {token}").parse().map_err(|_| {
                    ProviderError::Configuration {
                        message: "api key is not a valid header value".to_string(),
                    }
                })?;
                default_headers.insert("Authorization", value);
            }
            AuthStrategy::Header { name, value } => {
                let name: reqwest::header::HeaderName =
                    name.parse().map_err(|_| ProviderError::Configuration {
                        message: format!("invalid header name: {name}"),
                    })?;
                let value = value.parse().map_err(|_| ProviderError::Configuration {
                    message: "invalid header value".to_string(),
                })?;
                default_headers.insert(name, value);
            }
            AuthStrategy::None => {}
        }

        for (name, value) in extra_headers {
            let name: reqwest::header::HeaderName =
                name.parse().map_err(|_| ProviderError::Configuration {
                    message: format!("invalid header name: {name}"),
                })?;
            let value = value.parse().map_err(|_| ProviderError::Configuration {
                message: "invalid header value".to_string(),
            })?;
            default_headers.insert(name, value);
        }

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            default_headers,
        })
    }

    fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url.trim_end_matches('/'), path)
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), path)
        }
    }

    pub async fn post_json<TReq: Serialize + Sync, TResp: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TResp, ProviderError> {
        let url = self.build_url(path);
        let resp = self
            .http
            .request(Method::POST, url)
            .headers(self.default_headers.clone())
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(map_error_response(resp).await);
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

async fn map_error_response(resp: Response) -> ProviderError {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable error body>".to_string());
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").cloned())
        .and_then(|e| {
            e.get("message")
                .and_then(|m| m.as_str().map(str::to_string))
                .or_else(|| e.as_str().map(str::to_string))
        })
        .unwrap_or(body);

    ProviderError::Transport {
        message: format!("HTTP {status}: {message}"),
    }
}
