//! Loading shared by every command: reference date, config, snapshot

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_core::import::{load_categories, load_transactions};
use tally_core::models::{Category, Transaction};
use tally_core::AnalyticsConfig;
use tracing::warn;

/// Transactions and categories read from disk
#[derive(Debug, Default)]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
}

/// Parse a YYYY-MM-DD command-line date
pub fn parse_date_arg(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
}

/// `--today` if given, otherwise the local calendar date
pub fn resolve_today(today: Option<&str>) -> Result<NaiveDate> {
    match today {
        Some(value) => parse_date_arg(value, "--today"),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<AnalyticsConfig> {
    AnalyticsConfig::load(path).context("Failed to load analytics config")
}

/// Load the transaction file and, when given, the category file
pub fn load_snapshot(transactions: &Path, categories: Option<&Path>) -> Result<Snapshot> {
    let imported = load_transactions(transactions).with_context(|| {
        format!(
            "Failed to load transactions from {}",
            transactions.display()
        )
    })?;
    if imported.stats.skipped > 0 {
        warn!(
            skipped = imported.stats.skipped,
            "Some transaction rows could not be read"
        );
    }

    let categories = match categories {
        Some(path) => {
            let imported = load_categories(path)
                .with_context(|| format!("Failed to load categories from {}", path.display()))?;
            if imported.stats.skipped > 0 {
                warn!(
                    skipped = imported.stats.skipped,
                    "Some category rows could not be read"
                );
            }
            imported.records
        }
        None => Vec::new(),
    };

    Ok(Snapshot {
        transactions: imported.records,
        categories,
    })
}
