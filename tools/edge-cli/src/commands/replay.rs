//! Batch enrichment of recorded events.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use edge_enrich::ResponseEnricher;
use edge_observability::OutcomeTally;
use serde::Serialize;

use super::ReplayArgs;
use crate::context::Context;
use crate::fixtures::{counter_store, load_event};
use crate::output::outcome_badge;

#[derive(Debug, Serialize)]
struct ReplaySummary {
    events: usize,
    invalid: Vec<String>,
    tally: OutcomeTally,
}

/// Run the replay command.
pub async fn run(args: ReplayArgs, ctx: &Context) -> Result<()> {
    let dir = ctx.resolve_path(&args.dir);
    let events = event_files(&dir)?;

    if events.is_empty() {
        ctx.output
            .info(&format!("No event records (*.json) in {}", dir.display()));
        return Ok(());
    }

    let config = ctx.enricher_config()?;
    let counters = args.counters.as_deref().map(|p| ctx.resolve_path(p));
    let store = counter_store(counters.as_deref(), args.fail_lookup, config.lookup_budget())?;
    let enricher = ResponseEnricher::from_config(store, &config);

    ctx.output.header(&format!("Replaying: {}", dir.display()));
    ctx.output.kv("Events", &events.len().to_string());
    ctx.output.kv("Store", &config.counter_store);

    let progress = ctx.output.progress(events.len() as u64, "Enriching");
    let mut summary = ReplaySummary {
        events: events.len(),
        invalid: Vec::new(),
        tally: OutcomeTally::new(),
    };

    for path in &events {
        progress.inc(1);

        let event = match load_event(path) {
            Ok(event) => event,
            Err(err) => {
                progress.suspend(|| ctx.output.warn(&format!("{:#}", err)));
                summary.invalid.push(path.display().to_string());
                continue;
            }
        };

        let logger = match event.path() {
            Some(path) => ctx.logger(&config).with_path(path),
            None => ctx.logger(&config),
        };
        let (_, metrics) = enricher.enrich_observed(event, &logger).await;
        summary.tally.record(&metrics);
    }

    progress.finish_and_clear();

    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return Ok(());
    }

    ctx.output.success("Replay complete");
    ctx.output.table_row(&["OUTCOME", "COUNT"], &[16, 8]);
    ctx.output.info(&"-".repeat(26));
    for (outcome, count) in summary.tally.iter() {
        ctx.output
            .table_row(&[&outcome_badge(outcome), &count.to_string()], &[16, 8]);
    }

    ctx.output.info("");
    ctx.output.kv("Enriched", &summary.tally.total().to_string());
    ctx.output
        .kv("Slow lookups", &summary.tally.slow_lookups().to_string());
    if !summary.invalid.is_empty() {
        ctx.output
            .kv("Invalid records", &summary.invalid.len().to_string());
    }

    Ok(())
}

/// `*.json` files directly inside `dir`, in name order.
fn event_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    Ok(files)
}
