//! Variant path parsing.

use anyhow::Result;
use edge_enrich::parse_variant_path;

use super::ParseArgs;
use crate::context::Context;

/// Run the parse command.
pub async fn run(args: ParseArgs, ctx: &Context) -> Result<()> {
    let key = parse_variant_path(&args.path);

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "path": args.path,
            "variant": key.as_ref().map(|k| serde_json::json!({
                "imageId": k.image_id(),
                "size": k.size(),
            })),
        }));
        return Ok(());
    }

    match key {
        Some(key) => {
            ctx.output.success(&format!("Variant {}", key));
            ctx.output.kv("imageId", key.image_id());
            ctx.output.kv("size", key.size());
            if let Ok(config) = ctx.enricher_config() {
                ctx.output
                    .kv("store key", &key.store_key(&config.counter_key_prefix));
            }
        }
        None => ctx.output.info("Not a variant URL"),
    }

    Ok(())
}
