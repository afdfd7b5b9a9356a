//! Process-wide enricher configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Variable names understood by [`EnricherConfig::resolve`].
pub mod variable_names {
    /// Key-value store label holding the counters.
    pub const COUNTER_STORE: &str = "counter_store";
    /// Namespace prefix of counter keys.
    pub const COUNTER_KEY_PREFIX: &str = "counter_key_prefix";
    /// Origin base URL the edge component proxies to.
    pub const ORIGIN_URL: &str = "origin_url";
    /// Lookup latency budget in milliseconds.
    pub const LOOKUP_BUDGET_MS: &str = "lookup_budget_ms";
    /// Minimum log level.
    pub const LOG_LEVEL: &str = "log_level";
    /// Log output format.
    pub const LOG_FORMAT: &str = "log_format";

    /// Every recognized variable.
    pub const ALL: [&str; 6] = [
        COUNTER_STORE,
        COUNTER_KEY_PREFIX,
        ORIGIN_URL,
        LOOKUP_BUDGET_MS,
        LOG_LEVEL,
        LOG_FORMAT,
    ];
}

/// Error resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("'{0}' must not be empty")]
    Empty(&'static str),

    #[error("'{name}' is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("'{0}' must be an http:// or https:// URL")]
    InvalidOrigin(String),

    #[error("'{0}' is required")]
    Missing(&'static str),
}

/// Configuration shared by every invocation.
///
/// Resolved once at startup and never re-read per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnricherConfig {
    /// Key-value store label (the logical counter table).
    pub counter_store: String,
    /// Namespace prefix for counter keys.
    pub counter_key_prefix: String,
    /// Origin base URL, if this process proxies to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_url: Option<String>,
    /// Lookup latency budget in milliseconds.
    pub lookup_budget_ms: u64,
    /// Minimum log level name.
    pub log_level: String,
    /// Log output format name.
    pub log_format: String,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            counter_store: "default".to_string(),
            counter_key_prefix: "counters".to_string(),
            origin_url: None,
            lookup_budget_ms: 100,
            log_level: "info".to_string(),
            log_format: "json".to_string(),
        }
    }
}

impl EnricherConfig {
    /// Resolve configuration from a name → value source.
    ///
    /// Names missing from the source (or blank) keep their defaults.
    pub fn resolve<F>(source: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().overlay(source)
    }

    /// Apply values from a source on top of this configuration.
    pub fn overlay<F>(mut self, source: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        use variable_names::*;

        let get = |name: &str| source(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(COUNTER_STORE) {
            self.counter_store = v;
        }
        if let Some(v) = get(COUNTER_KEY_PREFIX) {
            self.counter_key_prefix = v;
        }
        if let Some(v) = get(ORIGIN_URL) {
            self.origin_url = Some(v);
        }
        if let Some(v) = get(LOOKUP_BUDGET_MS) {
            self.lookup_budget_ms = v.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                name: LOOKUP_BUDGET_MS,
                value: v.clone(),
            })?;
        }
        if let Some(v) = get(LOG_LEVEL) {
            self.log_level = v.trim().to_lowercase();
        }
        if let Some(v) = get(LOG_FORMAT) {
            self.log_format = v.trim().to_lowercase();
        }

        self.validate()?;
        Ok(self)
    }

    /// Check field values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.counter_store.trim().is_empty() {
            return Err(ConfigError::Empty(variable_names::COUNTER_STORE));
        }
        if self.counter_key_prefix.trim().is_empty() {
            return Err(ConfigError::Empty(variable_names::COUNTER_KEY_PREFIX));
        }
        if let Some(origin) = &self.origin_url {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(ConfigError::InvalidOrigin(origin.clone()));
            }
        }
        Ok(())
    }

    /// Origin base URL, required by proxying components.
    pub fn require_origin(&self) -> Result<&str, ConfigError> {
        self.origin_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .ok_or(ConfigError::Missing(variable_names::ORIGIN_URL))
    }

    /// Lookup latency budget.
    pub fn lookup_budget(&self) -> Duration {
        Duration::from_millis(self.lookup_budget_ms)
    }
}
