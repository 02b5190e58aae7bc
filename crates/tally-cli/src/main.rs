//! Tally CLI - Spending analytics and recurring charge detection
//!
//! Usage:
//!   tally --transactions tx.csv trend          Trailing 12-month spending
//!   tally --transactions tx.csv categories     Spending by category this month
//!   tally --transactions tx.csv recurring      Detected subscriptions and bills
//!   tally --transactions tx.json dashboard     Every view as JSON

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use clap::Parser;
use tally_core::Analytics;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

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
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let today = commands::resolve_today(cli.today.as_deref())?;
    let config = commands::load_config(cli.config.as_deref())?;
    let snapshot = commands::load_snapshot(&cli.transactions, cli.categories.as_deref())?;
    let analytics = Analytics::with_config(
        &snapshot.transactions,
        &snapshot.categories,
        today,
        config,
    )
    .context("Invalid analytics configuration")?;

    let window = |period: &PeriodArgs| {
        commands::resolve_period(
            &period.period,
            period.from.as_deref(),
            period.to.as_deref(),
            today,
        )
    };

    match cli.command {
        Commands::Trend => commands::cmd_trend(&analytics, cli.json),
        Commands::Overview => commands::cmd_overview(&analytics, cli.json),
        Commands::Categories { period } => {
            commands::cmd_categories(&analytics, window(&period)?, cli.json)
        }
        Commands::Drilldown { period } => {
            commands::cmd_drilldown(&analytics, window(&period)?, cli.json)
        }
        Commands::Merchants { period, limit } => {
            commands::cmd_merchants(&analytics, window(&period)?, limit, cli.json)
        }
        Commands::Monthly => commands::cmd_monthly(&analytics, cli.json),
        Commands::Recurring { all } => commands::cmd_recurring(&analytics, all, cli.json),
        Commands::Budget { period } => commands::cmd_budget(&analytics, window(&period)?, cli.json),
        Commands::Forecast => commands::cmd_forecast(&analytics, cli.json),
        Commands::Dashboard { period } => commands::cmd_dashboard(&analytics, window(&period)?),
    }
}
