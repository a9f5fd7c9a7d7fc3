//! Mizan CLI - Compliance-aware spending insights
//!
//! Usage:
//!   mizan classify --code 5411 --name "Fresh Market"   Classify one merchant
//!   mizan import --file raw.csv --output history.json  Classify a CSV export
//!   mizan summary --file history.json --window last-7-days
//!   mizan insights --file history.json --json

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.rules.as_deref())?;
    let offset = commands::parse_utc_offset(cli.utc_offset)?;
    let aggregator = commands::aggregator(cli.order, offset);

    match cli.command {
        Commands::Classify { code, name } => commands::cmd_classify(&config, &code, &name),
        Commands::Import { file, output } => {
            commands::cmd_import(&config, &file, output.as_deref())
        }
        Commands::Summary { file, window, now } => {
            commands::cmd_summary(&config, aggregator, &file, &window, now.as_deref())
        }
        Commands::Insights { file, now, json } => {
            commands::cmd_insights(&config, aggregator, &file, now.as_deref(), json)
        }
        Commands::Rules => commands::cmd_rules(&config),
    }
}
