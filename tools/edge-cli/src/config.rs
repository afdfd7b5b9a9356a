//! CLI configuration.

use anyhow::{Context, Result};
use edge_core::{variable_names, EnricherConfig};
use serde::{Deserialize, Serialize};

/// Prefix of environment variables overriding `[enricher]` values.
pub const ENV_PREFIX: &str = "EDGE_";

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Enricher settings, as the edge component would resolve them.
    #[serde(default)]
    pub enricher: EnricherConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Resolve the enricher config with `EDGE_<NAME>` environment overrides.
    pub fn resolve(&self) -> Result<EnricherConfig> {
        self.resolve_with(|name| std::env::var(env_name(name)).ok())
    }

    /// Resolve the enricher config with overrides from `env`.
    ///
    /// `env` is queried with the full variable name, e.g. `EDGE_COUNTER_STORE`.
    pub fn resolve_with<F>(&self, env: F) -> Result<EnricherConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.enricher
            .clone()
            .overlay(|name| env(&env_name(name)))
            .context("Invalid enricher configuration")
    }

    /// Overrides currently set in the environment, by variable name.
    pub fn env_overrides() -> Vec<(String, String)> {
        variable_names::ALL
            .iter()
            .filter_map(|name| {
                let key = env_name(name);
                std::env::var(&key).ok().map(|value| (key, value))
            })
            .collect()
    }
}

/// Environment variable name for a config variable.
pub fn env_name(name: &str) -> String {
    format!("{}{}", ENV_PREFIX, name.to_uppercase())
}

/// Generate a default edge.toml config file.
pub fn generate_default_config() -> String {
    r#"# View-count enricher configuration

[enricher]
counter_store = "default"
counter_key_prefix = "counters"
# origin_url = "https://images-origin.example.com"
lookup_budget_ms = 100
log_level = "info"
log_format = "human"
"#
    .to_string()
}
