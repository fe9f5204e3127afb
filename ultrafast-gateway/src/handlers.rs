//! # HTTP Request Handlers
//!
//! `POST /chat` is the data-plane's only request-processing endpoint; the
//! control-plane listener these handlers would pair with is not
//! implemented here. `GET /health` is a supplemental liveness probe.

use std::str::FromStr;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use ultrafast_models_sdk::{CanonicalRequest, ProviderId};

use crate::dispatcher::DispatchOutcome;
use crate::error::{rate_limit_headers, GatewayError};
use crate::logger::StructuredLogger;
use crate::server::AppState;

const PROVIDER_HEADER: &str = "x-llm-provider";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CanonicalRequest>,
) -> Response {
    let primary = match parse_provider_header(&headers) {
        Ok(id) => id,
        Err(message) => return GatewayError::InvalidRequest { message }.into_response(),
    };
    let client_ip = client_ip(&headers);
    let logger = StructuredLogger::new(
        state.admin.verbose_logging(),
        (*state.admin.logging_config()).clone(),
    );

    match state
        .dispatcher
        .dispatch(primary, &client_ip, &request, &logger)
        .await
    {
        DispatchOutcome::Success { response, admission } => {
            let mut resp = Json(response).into_response();
            resp.headers_mut().extend(rate_limit_headers(
                admission.limit,
                admission.remaining,
                admission.reset_seconds,
            ));
            resp
        }
        DispatchOutcome::RateLimited(admission) => GatewayError::RateLimited {
            limit: admission.limit,
            remaining: admission.remaining,
            reset: admission.reset_seconds,
        }
        .into_response(),
        DispatchOutcome::Failed(error) => GatewayError::Upstream(error).into_response(),
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

fn parse_provider_header(headers: &HeaderMap) -> Result<ProviderId, String> {
    let raw = headers
        .get(PROVIDER_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| format!("missing {PROVIDER_HEADER} header"))?;
    ProviderId::from_str(raw).map_err(|_| format!("unknown provider: {raw}"))
}

fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}
