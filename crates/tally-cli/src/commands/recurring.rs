//! Recurring transaction commands

use anyhow::Result;
use tally_core::models::Cadence;
use tally_core::Analytics;

use super::{print_json, truncate};

/// List detected recurring charges; `all` also lists groups that were
/// analysed but not promoted.
pub fn cmd_recurring(analytics: &Analytics, all: bool, json: bool) -> Result<()> {
    if all {
        return cmd_recurring_all(analytics, json);
    }

    let candidates = analytics.potential_recurring_transactions();
    if json {
        return print_json(&candidates);
    }

    println!();
    println!("🔁 Recurring Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    if candidates.is_empty() {
        println!("   No recurring transactions detected.");
        return Ok(());
    }

    println!(
        "   {:25} │ {:>10} │ {:>9} │ {:>5} │ {:>10}",
        "Merchant", "Amount", "Freq", "Count", "Next"
    );
    println!("   ──────────────────────────┼────────────┼───────────┼───────┼────────────");

    for c in &candidates {
        let next = c
            .next_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:25} │ {:>10.2} │ {:>9} │ {:>5} │ {:>10}",
            truncate(&c.merchant_key, 25),
            c.amount,
            c.frequency.as_str(),
            c.transaction_ids.len(),
            next
        );
    }

    Ok(())
}

fn cmd_recurring_all(analytics: &Analytics, json: bool) -> Result<()> {
    let groups = analytics.recurring_classifications();
    if json {
        return print_json(&groups);
    }

    println!();
    println!("🔁 Repeated Charges (all groups)");
    println!("   ─────────────────────────────────────────────────────────────");

    if groups.is_empty() {
        println!("   No repeated charges found.");
        return Ok(());
    }

    println!(
        "   {:25} │ {:>10} │ {:>12} │ {:>8} │ {:>7}",
        "Merchant", "Amount", "Cadence", "Mean gap", "Std dev"
    );
    println!("   ──────────────────────────┼────────────┼──────────────┼──────────┼─────────");

    for g in &groups {
        let marker = match g.classification.cadence {
            Cadence::Other | Cadence::Inconsistent => "  ",
            _ => "✅",
        };
        println!(
            "   {:25} │ {:>10.2} │ {:>12} │ {:>8.1} │ {:>7.1} {}",
            truncate(&g.merchant_key, 25),
            g.amount,
            g.classification.cadence.as_str(),
            g.mean_gap,
            g.std_dev_gap,
            marker
        );
    }

    Ok(())
}
