//! Edge CLI - Command line tool for the view-count edge enricher.
//!
//! Commands:
//! - `edge parse` - Show the variant a request path maps to
//! - `edge enrich` - Enrich one CDN event record against fixture counters
//! - `edge replay` - Enrich a directory of event records and tally outcomes
//! - `edge config` - Manage configuration

mod commands;
mod config;
mod context;
mod fixtures;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{ConfigArgs, EnrichArgs, ParseArgs, ReplayArgs};

/// Edge CLI - Exercise the view-count enricher locally
#[derive(Parser)]
#[command(name = "edge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a request path into its variant
    Parse(ParseArgs),

    /// Enrich a single event record
    Enrich(EnrichArgs),

    /// Enrich every event record in a directory
    Replay(ReplayArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Parse(args) => commands::parse::run(args, &ctx).await,
        Commands::Enrich(args) => commands::enrich::run(args, &ctx).await,
        Commands::Replay(args) => commands::replay::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
