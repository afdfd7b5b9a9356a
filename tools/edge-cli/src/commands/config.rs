//! Configuration management commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    let config = ctx.enricher_config()?;

    if ctx.output.is_json() {
        ctx.output.json(&config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    ctx.output.info("");
    ctx.output.info("[enricher]");
    ctx.output.kv("counter_store", &config.counter_store);
    ctx.output.kv("counter_key_prefix", &config.counter_key_prefix);
    ctx.output.kv(
        "origin_url",
        config.origin_url.as_deref().unwrap_or("(unset)"),
    );
    ctx.output
        .kv("lookup_budget_ms", &config.lookup_budget_ms.to_string());
    ctx.output.kv("log_level", &config.log_level);
    ctx.output.kv("log_format", &config.log_format);

    let overrides = CliConfig::env_overrides();
    if !overrides.is_empty() {
        ctx.output.info("");
        ctx.output.info("Environment overrides:");
        for (key, value) in &overrides {
            ctx.output.list_item(&format!("{}={}", key, value));
        }
    }

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("edge.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let config = ctx.enricher_config()?;
    let mut warnings: Vec<String> = Vec::new();

    if config.origin_url.is_none() {
        warnings.push("origin_url is unset; the edge component requires it".to_string());
    }

    if config.log_level.parse::<edge_observability::LogLevel>().is_err() {
        warnings.push(format!(
            "log_level '{}' is unknown and falls back to info",
            config.log_level
        ));
    }

    if config.log_format.parse::<edge_observability::LogFormat>().is_err() {
        warnings.push(format!(
            "log_format '{}' is unknown and falls back to json",
            config.log_format
        ));
    }

    if config.lookup_budget_ms == 0 {
        warnings.push("lookup_budget_ms = 0 flags every lookup as slow".to_string());
    }

    match find_manifest(&ctx.cwd) {
        Some(path) => {
            let manifest = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
            let declared = declared_kv_stores(&manifest)
                .with_context(|| format!("Invalid manifest: {}", path.display()))?;
            warnings.extend(counter_store_warning(&config.counter_store, &declared, &path));
        }
        None if config.counter_store != "default" => warnings.push(format!(
            "counter_store '{}' must be listed in key_value_stores in spin.toml",
            config.counter_store
        )),
        None => {}
    }

    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Spin manifest of the edge component, in the working directory or the
/// workspace layout.
fn find_manifest(cwd: &Path) -> Option<PathBuf> {
    [
        cwd.join("spin.toml"),
        cwd.join("workloads/view-counter/spin.toml"),
    ]
    .into_iter()
    .find(|path| path.is_file())
}

/// Key-value store labels any component of a Spin manifest may open.
fn declared_kv_stores(manifest: &str) -> Result<Vec<String>> {
    let manifest: toml::Value = toml::from_str(manifest)?;

    let mut labels = Vec::new();
    if let Some(components) = manifest.get("component").and_then(|c| c.as_table()) {
        for component in components.values() {
            let stores = component
                .get("key_value_stores")
                .and_then(|s| s.as_array())
                .into_iter()
                .flatten();
            labels.extend(stores.filter_map(|s| s.as_str()).map(str::to_string));
        }
    }

    Ok(labels)
}

/// Lookups against an undeclared store fail as unavailable on every request.
fn counter_store_warning(store: &str, declared: &[String], manifest: &Path) -> Option<String> {
    if declared.iter().any(|label| label == store) {
        return None;
    }

    Some(format!(
        "counter_store '{}' is not in key_value_stores of {}; every lookup will fail",
        store,
        manifest.display()
    ))
}
