//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use edge_core::{EnricherConfig, RequestId};
use edge_observability::{LogFormat, StructuredLogger};

use crate::config::CliConfig;
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the configuration came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try to find config in current directory or parent directories
            match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let config_names = ["edge.toml", ".edge.toml", "edge.json"];

        let mut current = start.to_path_buf();
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some((config, config_path));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolved enricher configuration.
    pub fn enricher_config(&self) -> Result<EnricherConfig> {
        self.config.resolve()
    }

    /// Logger for an enrichment run.
    ///
    /// Human lines unless JSON output was requested; only warnings and up
    /// unless verbose.
    pub fn logger(&self, config: &EnricherConfig) -> StructuredLogger {
        let logger = StructuredLogger::from_config(RequestId::generate(), config)
            .with_component("edge-cli");

        let logger = if self.output.is_json() {
            logger.with_format(LogFormat::Json)
        } else {
            logger.with_format(LogFormat::Human)
        };

        if self.output.is_verbose() {
            logger
        } else {
            logger.with_min_level(edge_observability::LogLevel::Warn)
        }
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}
