//! Month-bucketed views anchored to `today`

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::ReportsConfig;
use crate::error::{Error, Result};
use crate::models::{
    CategoryTrend, MonthKey, MonthlyTrends, PeriodTotal, Transaction, TrendComparison,
    TrendDataPoint,
};

use super::usable_amount;

/// Decides which expenses count as investment contributions.
///
/// Contributions are money moved into savings, so net savings adds them back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestmentRule {
    keywords: Vec<String>,
}

impl InvestmentRule {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// A rule that never matches
    pub fn none() -> Self {
        Self {
            keywords: Vec::new(),
        }
    }

    pub fn from_config(config: &ReportsConfig) -> Self {
        Self::new(&config.investment_keywords)
    }

    /// Case-insensitive substring match against any keyword
    pub fn matches(&self, description: &str) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let lower = description.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }
}

impl Default for InvestmentRule {
    fn default() -> Self {
        Self::from_config(&ReportsConfig::default())
    }
}

/// Expense totals for the trailing `months` calendar months ending at the
/// month of `today`, oldest first. Every month is present even when empty.
pub fn spending_trend(
    transactions: &[Transaction],
    today: NaiveDate,
    months: u32,
) -> Result<Vec<TrendDataPoint>> {
    if months == 0 {
        return Err(Error::InvalidData(
            "Trend must cover at least one month".to_string(),
        ));
    }

    let months = i64::from(months);
    let first = MonthKey::from_date(today).offset(-(months - 1));
    let mut points: Vec<TrendDataPoint> = (0..months)
        .map(|i| TrendDataPoint::zero(first.offset(i)))
        .collect();

    for tx in transactions.iter().filter(|t| t.is_expense()) {
        let index = first.months_until(MonthKey::from_date(tx.date));
        if !(0..months).contains(&index) {
            continue;
        }
        let Some(amount) = usable_amount(tx) else {
            continue;
        };
        let point = &mut points[index as usize];
        point.amount += amount;
        point.transaction_count += 1;
    }

    Ok(points)
}

/// Monthly spending and income from the earlier of `lookback_months` before
/// today or the earliest transaction's month, through the current month.
///
/// Transactions dated after the current month are not counted.
pub fn spending_overview(
    transactions: &[Transaction],
    today: NaiveDate,
    lookback_months: u32,
) -> Vec<PeriodTotal> {
    let current = MonthKey::from_date(today);
    let lookback_start = current.offset(-i64::from(lookback_months));
    let start = transactions
        .iter()
        .map(|t| MonthKey::from_date(t.date))
        .min()
        .map_or(lookback_start, |earliest| earliest.min(lookback_start));

    let count = start.months_until(current) + 1;
    debug!(start = %start, end = %current, months = count, "Building spending overview");

    let mut totals: Vec<PeriodTotal> = (0..count)
        .map(|i| PeriodTotal::zero(start.offset(i)))
        .collect();

    for tx in transactions {
        let index = start.months_until(MonthKey::from_date(tx.date));
        if !(0..count).contains(&index) {
            continue;
        }
        let Some(amount) = usable_amount(tx) else {
            continue;
        };
        let bucket = &mut totals[index as usize];
        if tx.is_expense() {
            bucket.total_spending += amount;
        } else {
            bucket.total_income += amount;
        }
    }

    totals
}

#[derive(Debug, Default)]
struct MonthSums {
    spending: f64,
    income: f64,
    investments: f64,
    by_category: BTreeMap<String, f64>,
}

impl MonthSums {
    fn collect(transactions: &[Transaction], month: MonthKey, rule: &InvestmentRule) -> Self {
        let mut sums = Self::default();
        for tx in transactions.iter().filter(|t| month.contains(t.date)) {
            let Some(amount) = usable_amount(tx) else {
                continue;
            };
            if tx.is_income() {
                sums.income += amount;
                continue;
            }
            sums.spending += amount;
            if rule.matches(&tx.description) {
                sums.investments += amount;
            }
            *sums
                .by_category
                .entry(tx.category_name().to_string())
                .or_insert(0.0) += amount;
        }
        sums
    }

    fn net_savings(&self) -> f64 {
        self.income - self.spending + self.investments
    }
}

/// The calendar month containing `today` compared with the month before it
pub fn monthly_trends(
    transactions: &[Transaction],
    today: NaiveDate,
    rule: &InvestmentRule,
) -> MonthlyTrends {
    let current_month = MonthKey::from_date(today);
    let previous_month = current_month.prev();

    let current = MonthSums::collect(transactions, current_month, rule);
    let previous = MonthSums::collect(transactions, previous_month, rule);

    let mut names: Vec<&String> = current
        .by_category
        .keys()
        .chain(previous.by_category.keys())
        .collect();
    names.sort();
    names.dedup();

    let categories = names
        .into_iter()
        .map(|name| CategoryTrend {
            category: name.clone(),
            comparison: TrendComparison::new(
                current.by_category.get(name).copied().unwrap_or(0.0),
                previous.by_category.get(name).copied().unwrap_or(0.0),
            ),
        })
        .collect();

    MonthlyTrends {
        current_month: current_month.label(),
        previous_month: previous_month.label(),
        spending: TrendComparison::new(current.spending, previous.spending),
        income: TrendComparison::new(current.income, previous.income),
        net_savings: TrendComparison::new(current.net_savings(), previous.net_savings()),
        categories,
    }
}
