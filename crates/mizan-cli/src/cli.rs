//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mizan_core::HistoryOrder;

/// Mizan - Compliance-aware spending insights
#[derive(Parser)]
#[command(name = "mizan")]
#[command(about = "Classify transactions by compliance and surface spending insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Rules file (defaults to the data-dir override, then the embedded rules)
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// UTC offset in minutes for calendar week/month boundaries (e.g. 180, -300)
    #[arg(long, global = true, default_value = "0", allow_hyphen_values = true)]
    pub utc_offset: i32,

    /// Order of the history file: newest-first, oldest-first or unsorted
    #[arg(long, global = true, default_value = "unsorted")]
    pub order: HistoryOrder,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a single merchant
    Classify {
        /// Merchant category code (e.g. 5411)
        #[arg(short, long)]
        code: String,

        /// Merchant name as it appears on the statement
        #[arg(short, long)]
        name: String,
    },

    /// Classify a raw transaction CSV
    Import {
        /// CSV file with id,timestamp,merchant_name,merchant_code,amount
        #[arg(short, long)]
        file: PathBuf,

        /// Write the classified history as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show spending totals for a window
    Summary {
        /// History file (.csv is classified on the fly, anything else is JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Window: this-week, last-week, this-month, last-month, last-24h,
        /// last-7-days, last-30-days
        #[arg(short, long, default_value = "this-week")]
        window: String,

        /// Reference instant (RFC 3339), defaults to the current time
        #[arg(long)]
        now: Option<String>,
    },

    /// Show alerts, recommendations and anomalies
    Insights {
        /// History file (.csv is classified on the fly, anything else is JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Reference instant (RFC 3339), defaults to the current time
        #[arg(long)]
        now: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active classification rules
    Rules,
}
