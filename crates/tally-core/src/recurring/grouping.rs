//! Grouping and interval analysis
//!
//! Buckets expense transactions by (merchant key, exact amount) and computes
//! the day gaps between consecutive charges plus their dispersion. No
//! classification happens here.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::models::Transaction;
use crate::normalize::MerchantNormalizer;

/// A (merchant, amount) group with its gap statistics
#[derive(Debug, Clone)]
pub struct TransactionGroup<'a> {
    pub merchant_key: String,
    /// Exact amount in integer cents
    pub amount_cents: i64,
    /// Oldest first
    pub transactions: Vec<&'a Transaction>,
    pub gaps: Vec<i64>,
    pub mean_gap: f64,
    pub std_dev_gap: f64,
}

impl TransactionGroup<'_> {
    pub fn amount(&self) -> f64 {
        self.amount_cents as f64 / 100.0
    }

    pub fn first_seen(&self) -> Option<NaiveDate> {
        self.transactions.first().map(|t| t.date)
    }

    pub fn last_seen(&self) -> Option<NaiveDate> {
        self.transactions.iter().map(|t| t.date).max()
    }

    pub fn transaction_ids(&self) -> Vec<String> {
        self.transactions.iter().map(|t| t.id.clone()).collect()
    }
}

/// Amount in whole cents, so 15.99 and 15.990000001 share a group.
///
/// Returns `None` for amounts that are not finite or too large to represent.
pub fn amount_key(amount: f64) -> Option<i64> {
    let cents = (amount.abs() * 100.0).round();
    if cents.is_finite() && cents < i64::MAX as f64 {
        Some(cents as i64)
    } else {
        None
    }
}

/// Whole-day gaps between consecutive dates
pub fn day_gaps(dates: &[NaiveDate]) -> Vec<i64> {
    dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days().abs())
        .collect()
}

/// Arithmetic mean (0 for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (0 for an empty slice)
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Group expense transactions by (merchant key, exact amount).
///
/// Only groups with at least `min_group_size` members (and therefore at least
/// two gaps) are returned, ordered by merchant key then amount.
pub fn group_transactions<'a>(
    transactions: &'a [Transaction],
    normalizer: &MerchantNormalizer,
    min_group_size: usize,
) -> Vec<TransactionGroup<'a>> {
    let mut buckets: BTreeMap<(String, i64), Vec<&'a Transaction>> = BTreeMap::new();

    for tx in transactions.iter().filter(|t| t.is_expense()) {
        let Some(cents) = amount_key(tx.amount) else {
            warn!(transaction = %tx.id, "Skipping transaction with non-finite amount");
            continue;
        };

        let merchant = normalizer.normalize(&tx.description);
        buckets.entry((merchant, cents)).or_default().push(tx);
    }

    let min_size = min_group_size.max(3);
    let mut groups = Vec::new();

    for ((merchant_key, amount_cents), mut txs) in buckets {
        if txs.len() < min_size {
            continue;
        }

        txs.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

        let dates: Vec<NaiveDate> = txs.iter().map(|t| t.date).collect();
        let gaps = day_gaps(&dates);
        if gaps.len() < 2 {
            continue;
        }

        let gap_values: Vec<f64> = gaps.iter().map(|&g| g as f64).collect();

        groups.push(TransactionGroup {
            merchant_key,
            amount_cents,
            transactions: txs,
            mean_gap: mean(&gap_values),
            std_dev_gap: population_std_dev(&gap_values),
            gaps,
        });
    }

    groups
}
