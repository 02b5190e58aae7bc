//! Recurring transaction detection
//!
//! Normalizes descriptions, groups expenses by (merchant, exact amount),
//! classifies each group's gap statistics, and projects the next charge for
//! groups with a standard cadence.

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::models::{Frequency, GroupClassification, RecurringCandidate, Transaction};
use crate::normalize::MerchantNormalizer;

use super::classifier::FrequencyClassifier;
use super::grouping::{group_transactions, TransactionGroup};

/// Detector bundling the normalizer and classifier it runs with
#[derive(Debug, Default)]
pub struct RecurringDetector {
    normalizer: MerchantNormalizer,
    classifier: FrequencyClassifier,
    min_group_size: usize,
}

impl RecurringDetector {
    pub fn new(config: &AnalyticsConfig) -> Result<Self> {
        Ok(Self {
            normalizer: MerchantNormalizer::new(&config.normalizer)?,
            classifier: FrequencyClassifier::new(config.classifier.clone()),
            min_group_size: config.detector.effective_min_group_size(),
        })
    }

    pub fn normalizer(&self) -> &MerchantNormalizer {
        &self.normalizer
    }

    fn min_group_size(&self) -> usize {
        self.min_group_size.max(3)
    }

    fn groups<'a>(&self, transactions: &'a [Transaction]) -> Vec<TransactionGroup<'a>> {
        let expense_count = transactions.iter().filter(|t| t.is_expense()).count();
        if expense_count < self.min_group_size() {
            debug!(expense_count, "Too few expenses for recurring detection");
            return Vec::new();
        }
        group_transactions(transactions, &self.normalizer, self.min_group_size())
    }

    /// Classify every qualifying group, including ones that are not promoted
    /// to candidates (`other` and `inconsistent`).
    pub fn analyze(&self, transactions: &[Transaction]) -> Vec<GroupClassification> {
        self.groups(transactions)
            .into_iter()
            .filter_map(|group| {
                let classification = self.classifier.classify(group.mean_gap, group.std_dev_gap);
                debug!(
                    merchant = %group.merchant_key,
                    amount = group.amount(),
                    mean_gap = group.mean_gap,
                    std_dev_gap = group.std_dev_gap,
                    cadence = %classification.cadence,
                    "Classified transaction group"
                );

                Some(GroupClassification {
                    amount: group.amount(),
                    classification,
                    transaction_ids: group.transaction_ids(),
                    first_seen: group.first_seen()?,
                    last_seen: group.last_seen()?,
                    mean_gap: group.mean_gap,
                    std_dev_gap: group.std_dev_gap,
                    gaps: group.gaps,
                    merchant_key: group.merchant_key,
                })
            })
            .collect()
    }

    /// Recurring candidates with a standard cadence, sorted by merchant key
    /// then amount.
    pub fn detect(&self, transactions: &[Transaction]) -> Vec<RecurringCandidate> {
        let mut candidates: Vec<RecurringCandidate> = self
            .groups(transactions)
            .into_iter()
            .filter_map(|group| {
                let classification = self.classifier.classify(group.mean_gap, group.std_dev_gap);
                let frequency = classification.cadence.frequency()?;
                build_candidate(group, frequency)
            })
            .collect();

        candidates.sort_by(|a, b| {
            a.merchant_key
                .cmp(&b.merchant_key)
                .then_with(|| a.amount.total_cmp(&b.amount))
        });

        info!(
            candidates = candidates.len(),
            transactions = transactions.len(),
            "Recurring detection complete"
        );

        candidates
    }
}

fn build_candidate(group: TransactionGroup<'_>, frequency: Frequency) -> Option<RecurringCandidate> {
    let last_date = group.last_seen()?;
    let amount = group.amount();

    Some(RecurringCandidate {
        id: candidate_id(&group.merchant_key, amount, frequency),
        amount,
        frequency,
        transaction_ids: group.transaction_ids(),
        transactions: group.transactions.iter().map(|&t| t.clone()).collect(),
        last_date,
        mean_gap: group.mean_gap,
        next_date: projected_next_date(last_date, group.mean_gap),
        merchant_key: group.merchant_key,
    })
}

/// Deterministic candidate id from merchant key, amount, and frequency
pub fn candidate_id(merchant_key: &str, amount: f64, frequency: Frequency) -> String {
    format!(
        "rec:{}:{:.2}:{}",
        merchant_key.replace(' ', "-"),
        amount,
        frequency.as_str()
    )
}

/// Last date plus the rounded mean gap; `None` when the gap is not positive
pub fn projected_next_date(last_date: NaiveDate, mean_gap: f64) -> Option<NaiveDate> {
    if !mean_gap.is_finite() || mean_gap <= 0.0 {
        return None;
    }
    let days = mean_gap.round() as i64;
    last_date.checked_add_signed(Duration::days(days))
}

/// Detect with the default configuration
pub fn detect(transactions: &[Transaction]) -> Vec<RecurringCandidate> {
    RecurringDetector::default().detect(transactions)
}
