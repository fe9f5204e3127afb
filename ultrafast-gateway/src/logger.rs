//! # Structured Logger
//!
//! A thin façade in front of `tracing`: it decides whether a record is
//! worth emitting, masks secret-shaped metadata, and (when enabled) fans
//! the record out to external sinks. It is not a replacement for
//! `tracing` — every record still goes through a `tracing` macro so the
//! usual subscriber/formatting machinery applies.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;

const MASKED_VALUE: &str = "********";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Which external sinks a record fans out to. All default to disabled;
/// the gateway never ships with a real Splunk/Datadog/Elasticsearch
/// integration, just the enable flags and the fire-and-forget call sites
/// a real one would hang off of.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub splunk_enabled: bool,
    pub datadog_enabled: bool,
    pub elasticsearch_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
struct LogRecord {
    timestamp: String,
    level: String,
    component: String,
    message: String,
    metadata: HashMap<String, String>,
}

pub struct StructuredLogger {
    verbose: bool,
    config: LoggingConfig,
}

impl StructuredLogger {
    pub fn new(verbose: bool, config: LoggingConfig) -> Self {
        Self { verbose, config }
    }

    pub fn log(
        &self,
        level: LogLevel,
        component: &str,
        message: &str,
        metadata: &HashMap<String, String>,
    ) {
        if level == LogLevel::Debug && !self.verbose {
            return;
        }

        let masked_metadata = mask_api_keys(metadata);
        let record = LogRecord {
            timestamp: Utc::now().to_rfc3339(),
            level: level_name(level).to_string(),
            component: component.to_string(),
            message: message.to_string(),
            metadata: masked_metadata,
        };

        match level {
            LogLevel::Debug => tracing::debug!(record = ?record, "{}", record.message),
            LogLevel::Info => tracing::info!(record = ?record, "{}", record.message),
            LogLevel::Warn => tracing::warn!(record = ?record, "{}", record.message),
            LogLevel::Error => tracing::error!(record = ?record, "{}", record.message),
        }

        if self.config.splunk_enabled {
            spawn_fire_and_forget("splunk", record.clone());
        }
        if self.config.datadog_enabled {
            spawn_fire_and_forget("datadog", record.clone());
        }
        if self.config.elasticsearch_enabled {
            spawn_fire_and_forget("elasticsearch", record);
        }
    }
}

fn level_name(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "DEBUG",
        LogLevel::Info => "INFO",
        LogLevel::Warn => "WARN",
        LogLevel::Error => "ERROR",
    }
}

fn mask_api_keys(metadata: &HashMap<String, String>) -> HashMap<String, String> {
    metadata
        .iter()
        .map(|(k, v)| {
            if k.to_lowercase().contains("apikey") {
                (k.clone(), MASKED_VALUE.to_string())
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect()
}

/// Fire-and-forget dispatch to an external sink. A real integration would
/// hand the record to that sink's client here; this gateway only owns the
/// decision of whether to fan out, not the sink implementations.
fn spawn_fire_and_forget(sink: &'static str, record: LogRecord) {
    tokio::spawn(async move {
        tracing::trace!(sink, record = ?record, "fanned out log record");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_keys_containing_apikey_case_insensitively() {
        let mut metadata = HashMap::new();
        metadata.insert("ApiKey".to_string(), "sk-secret".to_string());
        metadata.insert("prompt".to_string(), "hello".to_string());

        let masked = mask_api_keys(&metadata);
        assert_eq!(masked.get("ApiKey"), Some(&MASKED_VALUE.to_string()));
        assert_eq!(masked.get("prompt"), Some(&"hello".to_string()));
    }

    #[test]
    fn debug_records_are_dropped_when_not_verbose() {
        let logger = StructuredLogger::new(false, LoggingConfig::default());
        // No assertion beyond "doesn't panic" — tracing has no test-local
        // sink here; the level-filtering behavior itself is exercised via
        // `mask_api_keys` and the admin-state toggle in `admin.rs`.
        logger.log(LogLevel::Debug, "test", "message", &HashMap::new());
    }
}
