//! Output guardrails applied to a provider's raw response text.
//!
//! [`filter`] is a pure function: same input, same config, same output.
//! The four steps run in a fixed order and must not be reordered — the
//! banned-phrase check runs against the *original* text, not the
//! truncated one, so a phrase can't be hidden in the part that gets cut.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Admin-mutable guardrail configuration, read as an atomic snapshot per
/// request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailConfig {
    pub banned_phrases: Vec<String>,
    pub min_length: usize,
    pub max_length: usize,
    pub require_disclaimer: bool,
    pub disclaimer: String,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            banned_phrases: Vec::new(),
            min_length: 0,
            max_length: usize::MAX,
            require_disclaimer: false,
            disclaimer: String::new(),
        }
    }
}

impl GuardrailConfig {
    pub fn is_valid(&self) -> bool {
        self.min_length <= self.max_length
    }
}

/// Runs `text` through the four guardrail steps, in order.
pub fn filter(text: &str, config: &GuardrailConfig) -> Result<String, ProviderError> {
    if text.len() < config.min_length {
        return Err(ProviderError::Guardrail {
            message: "response too short".to_string(),
        });
    }

    let lowercase_original = text.to_lowercase();
    for phrase in &config.banned_phrases {
        if lowercase_original.contains(&phrase.to_lowercase()) {
            return Err(ProviderError::Guardrail {
                message: format!("response contains banned phrase: {phrase}"),
            });
        }
    }

    let mut result = if text.len() > config.max_length {
        truncate_at_char_boundary(text, config.max_length)
    } else {
        text.to_string()
    };

    if config.require_disclaimer && !config.disclaimer.is_empty() {
        result.push_str("\n\n");
        result.push_str(&config.disclaimer);
    }

    Ok(result)
}

fn truncate_at_char_boundary(text: &str, max_len: usize) -> String {
    let mut end = max_len.min(text.len());
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GuardrailConfig {
        GuardrailConfig {
            banned_phrases: vec!["classified".to_string()],
            min_length: 3,
            max_length: 20,
            require_disclaimer: false,
            disclaimer: String::new(),
        }
    }

    #[test]
    fn rejects_text_shorter_than_min_length() {
        let err = filter("hi", &config()).unwrap_err();
        assert!(matches!(err, ProviderError::Guardrail { .. }));
    }

    #[test]
    fn truncates_rather_than_rejects_on_max_length() {
        let text = "this response is much too long to keep";
        let result = filter(text, &config()).unwrap();
        assert_eq!(result.len(), 20);
    }

    #[test]
    fn banned_phrase_check_runs_against_original_text_not_truncated() {
        // The banned phrase sits past the 20-char truncation point.
        let text = "a harmless opening but this part is classified";
        let err = filter(text, &config()).unwrap_err();
        assert!(matches!(err, ProviderError::Guardrail { .. }));
    }

    #[test]
    fn banned_phrase_check_is_case_insensitive() {
        let cfg = config();
        let err = filter("this is CLASSIFIED info", &cfg).unwrap_err();
        assert!(matches!(err, ProviderError::Guardrail { .. }));
    }

    #[test]
    fn appends_disclaimer_after_truncation_when_required() {
        let mut cfg = config();
        cfg.require_disclaimer = true;
        cfg.disclaimer = "Not advice.".to_string();
        cfg.banned_phrases.clear();

        let result = filter("short ok text", &cfg).unwrap();
        assert!(result.ends_with("\n\nNot advice."));
    }

    #[test]
    fn empty_disclaimer_with_require_flag_appends_nothing() {
        let mut cfg = config();
        cfg.require_disclaimer = true;
        cfg.banned_phrases.clear();

        let result = filter("short ok text", &cfg).unwrap();
        assert_eq!(result, "short ok text");
    }
}
