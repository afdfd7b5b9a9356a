//! Single-event enrichment.

use anyhow::Result;
use edge_core::{EdgeEvent, EventPayload, EventRecord, ResponseRecord};
use edge_enrich::ResponseEnricher;

use super::EnrichArgs;
use crate::context::Context;
use crate::fixtures::{counter_store, load_event};
use crate::output::outcome_badge;

/// Run the enrich command.
pub async fn run(args: EnrichArgs, ctx: &Context) -> Result<()> {
    let config = ctx.enricher_config()?;
    let counters = args.counters.as_deref().map(|p| ctx.resolve_path(p));
    let store = counter_store(counters.as_deref(), args.fail_lookup, config.lookup_budget())?;
    let enricher = ResponseEnricher::from_config(store, &config);

    let payload = load_event(&ctx.resolve_path(&args.event))?;
    let path = payload.path().unwrap_or("(malformed request)").to_string();
    ctx.output.debug(&format!("Enriching {}", path));

    let logger = match payload.path() {
        Some(path) => ctx.logger(&config).with_path(path),
        None => ctx.logger(&config),
    };
    let (response, metrics) = enricher.enrich_observed(payload.clone(), &logger).await;

    if ctx.output.is_json() {
        let record = match payload {
            EventPayload::Event(event) => {
                EventRecord::from_event(&EdgeEvent::new(event.request, response))
            }
            EventPayload::MalformedRequest { .. } => EventRecord::with_parts(None, &response),
        };
        ctx.output.json(&record);
        return Ok(());
    }

    ctx.output.header(&format!("{} [{}]", path, outcome_badge(metrics.outcome)));
    ctx.output.kv("status", response.status.as_str());
    for (name, values) in ResponseRecord::from_response(&response).headers {
        for value in values {
            ctx.output.kv(&name, &value.value);
        }
    }

    if ctx.output.is_verbose() {
        ctx.output.info("");
        for line in metrics.to_summary().lines() {
            ctx.output.info(line);
        }
    }

    Ok(())
}
