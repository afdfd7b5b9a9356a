//! CLI command implementations.

pub mod config;
pub mod enrich;
pub mod parse;
pub mod replay;

use clap::{Args, Subcommand};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Request path, e.g. /images/abc123/thumb.jpg
    pub path: String,
}

/// Arguments for the enrich command.
#[derive(Args)]
pub struct EnrichArgs {
    /// CDN event record (JSON).
    #[arg(short, long)]
    pub event: String,

    /// Counters fixture mapping "<imageId>/<size>" to stored records.
    #[arg(long)]
    pub counters: Option<String>,

    /// Make every counter lookup time out.
    #[arg(long)]
    pub fail_lookup: bool,
}

/// Arguments for the replay command.
#[derive(Args)]
pub struct ReplayArgs {
    /// Directory of CDN event records (*.json).
    pub dir: String,

    /// Counters fixture mapping "<imageId>/<size>" to stored records.
    #[arg(long)]
    pub counters: Option<String>,

    /// Make every counter lookup time out.
    #[arg(long)]
    pub fail_lookup: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the resolved configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the resolved configuration.
    Validate,
}
