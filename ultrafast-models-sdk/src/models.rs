//! Canonical request/response shapes shared by every provider adapter.
//!
//! These are the gateway's provider-agnostic message shape (see the
//! provider modules under `providers/` for the six wire-format mappings).

use serde::{Deserialize, Serialize};

/// Default sampling temperature applied when the caller omits one.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default max-token budget applied when the caller omits one.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// A caller's request before any provider-specific translation.
///
/// Immutable once accepted: nothing downstream mutates a `CanonicalRequest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "maxTokens")]
    pub max_tokens: Option<u32>,
}

impl CanonicalRequest {
    pub fn temperature_or_default(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

/// A provider's reply, normalized back to the canonical shape.
///
/// Immutable; returned to the caller verbatim and stored in the prompt
/// cache under `provider:prompt`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalResponse {
    pub text: String,
    #[serde(rename = "inputTokens")]
    pub input_tokens: u32,
    #[serde(rename = "outputTokens")]
    pub output_tokens: u32,
    pub model: String,
    pub provider: String,
}

/// Canonical identifier for a chat-completion provider.
///
/// `Display`/`FromStr` round-trip through the lowercase wire id used in
/// the `x-llm-provider` header, cache keys, and stats maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Openai,
    Anthropic,
    Gemini,
    Ollama,
    Mistral,
    Cohere,
}

impl ProviderId {
    pub const ALL: [ProviderId; 6] = [
        ProviderId::Openai,
        ProviderId::Anthropic,
        ProviderId::Gemini,
        ProviderId::Ollama,
        ProviderId::Mistral,
        ProviderId::Cohere,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Openai => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Gemini => "gemini",
            ProviderId::Ollama => "ollama",
            ProviderId::Mistral => "mistral",
            ProviderId::Cohere => "cohere",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderId::Openai),
            "anthropic" => Ok(ProviderId::Anthropic),
            "gemini" => Ok(ProviderId::Gemini),
            "ollama" => Ok(ProviderId::Ollama),
            "mistral" => Ok(ProviderId::Mistral),
            "cohere" => Ok(ProviderId::Cohere),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_round_trips_through_str() {
        for id in ProviderId::ALL {
            let parsed: ProviderId = id.as_str().parse().unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn canonical_request_applies_defaults() {
        let req = CanonicalRequest {
            prompt: "hi".to_string(),
            temperature: None,
            max_tokens: None,
        };
        assert_eq!(req.temperature_or_default(), DEFAULT_TEMPERATURE);
        assert_eq!(req.max_tokens_or_default(), DEFAULT_MAX_TOKENS);
    }
}
