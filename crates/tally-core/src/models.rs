//! Domain models for Tally

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Whether a transaction moves money in or out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "credit" => Ok(Self::Income),
            "expense" | "debit" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial transaction, as supplied by the external store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    /// Unsigned magnitude; `kind` carries the direction
    pub amount: f64,
    /// Category name (assigned externally)
    pub category: String,
    pub description: String,
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        date: NaiveDate,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            amount,
            category: category.into(),
            description: description.into(),
            kind,
        }
    }

    /// Shorthand for an expense transaction
    pub fn expense(
        id: impl Into<String>,
        date: NaiveDate,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(id, date, amount, category, description, TransactionKind::Expense)
    }

    /// Shorthand for an income transaction
    pub fn income(
        id: impl Into<String>,
        date: NaiveDate,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::new(id, date, amount, category, description, TransactionKind::Income)
    }

    /// Category name, or [`UNCATEGORIZED`] when blank
    pub fn category_name(&self) -> &str {
        let name = self.category.trim();
        if name.is_empty() {
            UNCATEGORIZED
        } else {
            name
        }
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    /// Absolute amount, or `None` when the stored amount is not a finite number.
    ///
    /// Signed amounts are tolerated: the sign is ignored and `kind` decides direction.
    pub fn magnitude(&self) -> Option<f64> {
        if self.amount.is_finite() {
            Some(self.amount.abs())
        } else {
            None
        }
    }
}

/// Label used for transactions with a blank category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A user-defined category with an optional monthly budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: TransactionKind,
        budget: Option<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            budget,
        }
    }
}

// ========== Calendar Models ==========

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month (year + month number)
///
/// Arithmetic is plain integer math so it never fails; converting back to a
/// `NaiveDate` is the only fallible step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn index(self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Shift by a number of months (negative goes back in time)
    pub fn offset(self, months: i64) -> Self {
        Self::from_index(self.index() + months)
    }

    pub fn prev(self) -> Self {
        self.offset(-1)
    }

    pub fn next(self) -> Self {
        self.offset(1)
    }

    /// Number of months from `self` to `other` (negative if `other` is earlier)
    pub fn months_until(self, other: MonthKey) -> i64 {
        other.index() - self.index()
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(self) -> Option<NaiveDate> {
        self.next().first_day()?.pred_opt()
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The whole month as an inclusive window
    pub fn window(self) -> Result<DateWindow> {
        match (self.first_day(), self.last_day()) {
            (Some(start), Some(end)) => DateWindow::new(start, end),
            _ => Err(Error::InvalidData(format!(
                "Month {} is outside the supported date range",
                self
            ))),
        }
    }

    /// Chart label, e.g. "Jan 2024"
    pub fn label(self) -> String {
        let name = MONTH_ABBREVIATIONS
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("???");
        format!("{} {:04}", name, self.year)
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// An inclusive date range: both `start` and `end` count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// The calendar month containing `today`, first to last day
    pub fn month_of(today: NaiveDate) -> Result<Self> {
        MonthKey::from_date(today).window()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

// ========== Report Models ==========

/// Spending and income for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotal {
    /// "Mon YYYY"
    pub period: String,
    pub year: i32,
    pub month: u32,
    pub total_spending: f64,
    pub total_income: f64,
}

impl PeriodTotal {
    pub fn zero(month: MonthKey) -> Self {
        Self {
            period: month.label(),
            year: month.year,
            month: month.month,
            total_spending: 0.0,
            total_income: 0.0,
        }
    }

    pub fn month_key(&self) -> Option<MonthKey> {
        MonthKey::new(self.year, self.month)
    }
}

/// A single month in the trailing spending trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendDataPoint {
    /// "Mon YYYY"
    pub period: String,
    pub year: i32,
    pub month: u32,
    pub amount: f64,
    pub transaction_count: usize,
}

impl TrendDataPoint {
    pub fn zero(month: MonthKey) -> Self {
        Self {
            period: month.label(),
            year: month.year,
            month: month.month,
            amount: 0.0,
            transaction_count: 0,
        }
    }
}

/// Expense total for one category in a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAggregate {
    pub name: String,
    pub value: f64,
    /// The category's configured budget, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

/// One contributing row in a category drill-down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetailItem {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
}

/// Category drill-down: the raw rows behind a category total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub category: String,
    pub total: f64,
    pub items: Vec<CategoryDetailItem>,
}

/// Expense total per raw description label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantAggregate {
    pub merchant: String,
    pub total: f64,
    pub transaction_count: usize,
}

/// Percent change from `previous` to `current`.
///
/// Defined as 0 when the baseline is 0, so the result is always finite for
/// finite inputs. Uses the baseline's magnitude so a move from -100 to -50
/// reads as an improvement (+50%).
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return 0.0;
    }
    (current - previous) / previous.abs() * 100.0
}

/// Current vs previous period value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendComparison {
    pub current: f64,
    pub previous: f64,
    pub percent_change: f64,
}

impl TrendComparison {
    pub fn new(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous,
            percent_change: percent_change(current, previous),
        }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Month-over-month comparison for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrend {
    pub category: String,
    pub comparison: TrendComparison,
}

/// Current calendar month vs the previous one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrends {
    pub current_month: String,
    pub previous_month: String,
    pub spending: TrendComparison,
    pub income: TrendComparison,
    /// Income minus spending, with investment contributions counted as saved
    pub net_savings: TrendComparison,
    pub categories: Vec<CategoryTrend>,
}

// ========== Recurring Models ==========

/// Billing cadence of an emitted recurring candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Annually,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annually => "annually",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full classification outcome for a transaction group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Weekly,
    Monthly,
    Quarterly,
    Annually,
    /// Regular, but not one of the standard cadences
    Other,
    Inconsistent,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annually => "annually",
            Self::Other => "other",
            Self::Inconsistent => "inconsistent",
        }
    }

    /// The standard frequency this cadence promotes to, if any
    pub fn frequency(&self) -> Option<Frequency> {
        match self {
            Self::Weekly => Some(Frequency::Weekly),
            Self::Monthly => Some(Frequency::Monthly),
            Self::Quarterly => Some(Frequency::Quarterly),
            Self::Annually => Some(Frequency::Annually),
            Self::Other | Self::Inconsistent => None,
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying a group's gap statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub is_consistent: bool,
    pub cadence: Cadence,
}

/// Every analysed (merchant, amount) group with its classification,
/// including groups that are not promoted to candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupClassification {
    pub merchant_key: String,
    pub amount: f64,
    pub classification: Classification,
    pub transaction_ids: Vec<String>,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub gaps: Vec<i64>,
    pub mean_gap: f64,
    pub std_dev_gap: f64,
}

/// A detected recurring payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringCandidate {
    /// Stable across runs over the same data
    pub id: String,
    pub merchant_key: String,
    pub amount: f64,
    pub frequency: Frequency,
    /// Contributing transaction ids, oldest first
    pub transaction_ids: Vec<String>,
    pub transactions: Vec<Transaction>,
    pub last_date: NaiveDate,
    pub mean_gap: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_date: Option<NaiveDate>,
}

// ========== Budget Models ==========

/// Budget vs actual for a budgeted expense category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetVariance {
    pub category: String,
    pub budget: f64,
    pub actual: f64,
    /// budget - actual (negative when over budget)
    pub variance: f64,
    pub variance_percentage: f64,
    pub is_over_budget: bool,
}

/// Expense category with no budget configured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnbudgetedCategory {
    pub category: String,
    pub actual: f64,
}

/// Budget variance report for a window
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetReport {
    pub variances: Vec<BudgetVariance>,
    pub unbudgeted: Vec<UnbudgetedCategory>,
}

// ========== Forecast Models ==========

/// Ordinary least-squares line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// One extrapolated future month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub period: String,
    pub year: i32,
    pub month: u32,
    pub amount: f64,
}

/// Spending trend line fitted over the trailing months plus its projection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpendingForecast {
    pub trend: LinearTrend,
    pub points: Vec<ForecastPoint>,
}
