//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI arguments.
//! The command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Tally - Spending analytics and recurring charge detection
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Spending analytics and recurring charge detection", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Transactions file (.json, or CSV for any other extension)
    #[arg(long, default_value = "transactions.csv", global = true)]
    pub transactions: PathBuf,

    /// Categories file (.json, or CSV for any other extension)
    #[arg(long, global = true)]
    pub categories: Option<PathBuf>,

    /// Analytics config file (TOML); defaults to the user override, then built-in
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD); defaults to the local date
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Window selection shared by the windowed reports
#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    /// Time period: this-month, last-month, this-year, last-30-days, last-90-days, last-12-months, all
    #[arg(long, default_value = "this-month")]
    pub period: String,

    /// Custom start date (YYYY-MM-DD) - overrides period, requires --to
    #[arg(long)]
    pub from: Option<String>,

    /// Custom end date (YYYY-MM-DD) - overrides period, requires --from
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trailing 12-month spending trend
    Trend,

    /// Monthly spending and income overview
    Overview,

    /// Spending by category against budget
    Categories {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Transactions behind each category total
    Drilldown {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Top merchants by spending
    Merchants {
        #[command(flatten)]
        period: PeriodArgs,

        /// Number of merchants to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Current month vs previous month
    Monthly,

    /// Detected recurring transactions
    Recurring {
        /// Include groups that are irregular or not a standard cadence
        #[arg(long)]
        all: bool,
    },

    /// Budget vs actual by category
    Budget {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Spending forecast for the next months
    Forecast,

    /// Every view as one JSON document
    Dashboard {
        #[command(flatten)]
        period: PeriodArgs,
    },
}
