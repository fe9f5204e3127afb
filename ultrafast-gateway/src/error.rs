//! Gateway-level error type and its HTTP response mapping.
//!
//! Every provider-side failure the dispatcher exhausts surfaces here as
//! [`GatewayError::Upstream`]; [`GatewayError::RateLimited`] and
//! [`GatewayError::InvalidRequest`] originate in the gateway itself, before
//! any provider is ever called.

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use ultrafast_models_sdk::ProviderError;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Every enabled provider in the failover chain failed; carries the
    /// last provider's error.
    #[error("upstream failure: {0}")]
    Upstream(#[from] ProviderError),

    /// Client exceeded the active rate limit plan.
    #[error("rate limit exceeded")]
    RateLimited {
        limit: u32,
        remaining: u32,
        reset: u64,
    },

    /// Malformed request body or unknown provider id.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::RateLimited {
                limit,
                remaining,
                reset,
            } => {
                let body = Json(json!({
                    "error": "rate limit exceeded",
                    "limit": limit,
                    "remaining": remaining,
                    "reset": reset,
                }));
                (StatusCode::TOO_MANY_REQUESTS, body).into_response()
            }
            GatewayError::InvalidRequest { message } => {
                let body = Json(json!({
                    "error": { "message": message, "type": "invalid_request" }
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            GatewayError::Upstream(provider_error) => {
                let body = Json(json!({
                    "error": {
                        "message": provider_error.to_string(),
                        "type": "upstream_failure",
                    }
                }));
                (StatusCode::BAD_GATEWAY, body).into_response()
            }
        }
    }
}

/// Builds the `RateLimit-*` headers attached to every successful `/chat`
/// response.
pub fn rate_limit_headers(limit: u32, remaining: u32, reset: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "RateLimit-Limit",
        HeaderValue::from_str(&limit.to_string()).unwrap(),
    );
    headers.insert(
        "RateLimit-Remaining",
        HeaderValue::from_str(&remaining.to_string()).unwrap(),
    );
    headers.insert(
        "RateLimit-Reset",
        HeaderValue::from_str(&reset.to_string()).unwrap(),
    );
    headers
}
