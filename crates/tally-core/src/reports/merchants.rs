//! Spending by raw merchant label

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{DateWindow, MerchantAggregate, Transaction};

use super::{check_window, expenses_in, usable_amount};

/// Expense total and count per description label in the window, sorted by
/// total descending (ties by label). `limit` keeps only the top entries.
///
/// Labels are the raw descriptions, trimmed; no normalization happens here.
pub fn merchant_spending(
    transactions: &[Transaction],
    window: &DateWindow,
    limit: Option<usize>,
) -> Result<Vec<MerchantAggregate>> {
    check_window(window)?;

    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for tx in expenses_in(transactions, window) {
        let Some(amount) = usable_amount(tx) else {
            continue;
        };
        let entry = totals.entry(tx.description.trim()).or_insert((0.0, 0));
        entry.0 += amount;
        entry.1 += 1;
    }

    let mut merchants: Vec<MerchantAggregate> = totals
        .into_iter()
        .map(|(merchant, (total, transaction_count))| MerchantAggregate {
            merchant: merchant.to_string(),
            total,
            transaction_count,
        })
        .collect();

    merchants.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.merchant.cmp(&b.merchant))
    });

    if let Some(limit) = limit {
        merchants.truncate(limit);
    }

    Ok(merchants)
}
