//! Error taxonomy for provider adapters.
//!
//! The dispatcher's failover decision is a pure function of the variant
//! tag here, never of a formatted message string.

use thiserror::Error;

/// Tagged error produced by a provider adapter's `call`.
///
/// Each tag maps to exactly one failover behavior in the dispatcher:
/// `Transport`, `Decode`, `Guardrail`, and `Timeout` all trigger failover
/// when another provider is enabled. `Configuration` does not — a missing
/// key or disabled provider won't be fixed by trying the next one, so it
/// is surfaced directly. `Cancelled` never does.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Provider not enabled, or its API key is empty.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Connection failure or non-2xx response from the provider.
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Response body could not be parsed into the expected shape.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Response text was rejected by the guardrails filter.
    #[error("guardrail violation: {message}")]
    Guardrail { message: String },

    /// Caller aborted the request; never triggers failover.
    #[error("request cancelled")]
    Cancelled,

    /// Per-provider HTTP deadline elapsed.
    #[error("request timed out")]
    Timeout,
}

impl ProviderError {
    /// Whether this error should advance the dispatcher to the next
    /// enabled provider.
    pub fn triggers_failover(&self) -> bool {
        !matches!(
            self,
            ProviderError::Cancelled | ProviderError::Configuration { .. }
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Decode {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_and_cancelled_do_not_trigger_failover() {
        assert!(!ProviderError::Cancelled.triggers_failover());
        assert!(!ProviderError::Configuration {
            message: "no key".to_string()
        }
        .triggers_failover());
    }

    #[test]
    fn transport_decode_guardrail_and_timeout_trigger_failover() {
        assert!(ProviderError::Transport {
            message: "boom".to_string()
        }
        .triggers_failover());
        assert!(ProviderError::Decode {
            message: "boom".to_string()
        }
        .triggers_failover());
        assert!(ProviderError::Guardrail {
            message: "boom".to_string()
        }
        .triggers_failover());
        assert!(ProviderError::Timeout.triggers_failover());
    }
}
