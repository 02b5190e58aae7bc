//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `snapshot` - Snapshot, config and reference-date loading shared by every command
//! - `recurring` - Recurring transaction listing
//! - `reports` - Aggregate reports, forecast and the JSON dashboard

pub mod recurring;
pub mod reports;
pub mod snapshot;

// Re-export command functions for main.rs
pub use recurring::*;
pub use reports::*;
pub use snapshot::*;

use anyhow::{Context, Result};
use serde::Serialize;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Pretty-print any report as JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output to JSON")?;
    println!("{}", json);
    Ok(())
}
