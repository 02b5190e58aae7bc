//! Analytics facade
//!
//! Binds a transaction/category snapshot, the reference date, and the
//! configuration, and exposes every view. This is where failures stop: a
//! view that cannot be computed is logged with its input sizes and window and
//! replaced by a fixed fallback, so callers always get a value.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::budget;
use crate::config::AnalyticsConfig;
use crate::error::Result;
use crate::forecast::SpendingForecaster;
use crate::models::{
    BudgetReport, Category, CategoryAggregate, CategoryDetail, DateWindow, GroupClassification,
    MerchantAggregate, MonthKey, MonthlyTrends, PeriodTotal, RecurringCandidate,
    SpendingForecast, Transaction, TrendDataPoint,
};
use crate::recurring::RecurringDetector;
use crate::reports::{self, check_window, zero_categories, InvestmentRule};

/// Fixed width of the recovered trend; only reached when the configured
/// `trailing_months` could not be used.
const FALLBACK_TREND_MONTHS: i64 = 12;

/// Every view in one serializable document
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<DateWindow>,
    pub spending_trend: Vec<TrendDataPoint>,
    pub spending_overview: Vec<PeriodTotal>,
    pub category_spending: Vec<CategoryAggregate>,
    pub detailed_category_spending: Vec<CategoryDetail>,
    pub monthly_trends: MonthlyTrends,
    pub merchant_spending: Vec<MerchantAggregate>,
    pub potential_recurring_transactions: Vec<RecurringCandidate>,
    pub budget_variances: BudgetReport,
    pub spending_forecast: SpendingForecast,
}

/// Analytics over one snapshot as of `today`
#[derive(Debug)]
pub struct Analytics<'a> {
    transactions: &'a [Transaction],
    categories: &'a [Category],
    today: NaiveDate,
    config: AnalyticsConfig,
    detector: RecurringDetector,
    investments: InvestmentRule,
}

impl<'a> Analytics<'a> {
    /// Analytics with the default configuration
    pub fn new(transactions: &'a [Transaction], categories: &'a [Category], today: NaiveDate) -> Self {
        Self {
            transactions,
            categories,
            today,
            config: AnalyticsConfig::default(),
            detector: RecurringDetector::default(),
            investments: InvestmentRule::default(),
        }
    }

    /// Analytics with a custom configuration (validated here)
    pub fn with_config(
        transactions: &'a [Transaction],
        categories: &'a [Category],
        today: NaiveDate,
        config: AnalyticsConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transactions,
            categories,
            today,
            detector: RecurringDetector::new(&config)?,
            investments: InvestmentRule::from_config(&config.reports),
            config,
        })
    }

    /// Analytics as of the local calendar date
    pub fn for_today(transactions: &'a [Transaction], categories: &'a [Category]) -> Self {
        Self::new(transactions, categories, chrono::Local::now().date_naive())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// The explicit window, or the calendar month containing `today`
    pub fn resolve_window(&self, window: Option<DateWindow>) -> Result<DateWindow> {
        match window {
            Some(window) => {
                check_window(&window)?;
                Ok(window)
            }
            None => DateWindow::month_of(self.today),
        }
    }

    fn recover<T>(
        &self,
        output: &'static str,
        window: Option<&DateWindow>,
        result: Result<T>,
        fallback: impl FnOnce() -> T,
    ) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    output,
                    error = %e,
                    transactions = self.transactions.len(),
                    categories = self.categories.len(),
                    window = ?window.map(|w| w.to_string()),
                    "Analytics view failed, returning fallback"
                );
                fallback()
            }
        }
    }

    /// Trailing monthly spending ending at the month of `today`
    pub fn spending_trend(&self) -> Vec<TrendDataPoint> {
        let result = reports::spending_trend(
            self.transactions,
            self.today,
            self.config.reports.trailing_months,
        );
        self.recover("spending_trend", None, result, || {
            fallback_trend(self.today)
        })
    }

    pub fn spending_overview(&self) -> Vec<PeriodTotal> {
        reports::spending_overview(
            self.transactions,
            self.today,
            self.config.reports.overview_lookback_months,
        )
    }

    pub fn category_spending(&self, window: Option<DateWindow>) -> Vec<CategoryAggregate> {
        let result = self.resolve_window(window).and_then(|w| {
            reports::category_spending(self.transactions, self.categories, &w)
        });
        self.recover("category_spending", window.as_ref(), result, || {
            zero_categories(self.categories)
        })
    }

    pub fn detailed_category_spending(&self, window: Option<DateWindow>) -> Vec<CategoryDetail> {
        let result = self
            .resolve_window(window)
            .and_then(|w| reports::detailed_category_spending(self.transactions, &w));
        self.recover("detailed_category_spending", window.as_ref(), result, Vec::new)
    }

    pub fn monthly_trends(&self) -> MonthlyTrends {
        reports::monthly_trends(self.transactions, self.today, &self.investments)
    }

    pub fn merchant_spending(
        &self,
        window: Option<DateWindow>,
        limit: Option<usize>,
    ) -> Vec<MerchantAggregate> {
        let result = self
            .resolve_window(window)
            .and_then(|w| reports::merchant_spending(self.transactions, &w, limit));
        self.recover("merchant_spending", window.as_ref(), result, Vec::new)
    }

    /// Recurring candidates with a standard cadence
    pub fn potential_recurring_transactions(&self) -> Vec<RecurringCandidate> {
        self.detector.detect(self.transactions)
    }

    /// Every analysed group, including `other` and `inconsistent` ones
    pub fn recurring_classifications(&self) -> Vec<GroupClassification> {
        self.detector.analyze(self.transactions)
    }

    pub fn budget_variances(&self, window: Option<DateWindow>) -> BudgetReport {
        let result = self.resolve_window(window).and_then(|w| {
            budget::budget_variances(self.transactions, self.categories, &w)
        });
        self.recover("budget_variances", window.as_ref(), result, BudgetReport::default)
    }

    /// Linear projection of the spending trend
    pub fn spending_forecast(&self) -> SpendingForecast {
        SpendingForecaster::with_periods(self.config.reports.forecast_periods)
            .forecast(&self.spending_trend())
    }

    /// Every view, with windowed views over `window` (default: this month)
    pub fn dashboard(&self, window: Option<DateWindow>) -> Dashboard {
        Dashboard {
            today: self.today,
            window: self.resolve_window(window).ok(),
            spending_trend: self.spending_trend(),
            spending_overview: self.spending_overview(),
            category_spending: self.category_spending(window),
            detailed_category_spending: self.detailed_category_spending(window),
            monthly_trends: self.monthly_trends(),
            merchant_spending: self.merchant_spending(window, None),
            potential_recurring_transactions: self.potential_recurring_transactions(),
            budget_variances: self.budget_variances(window),
            spending_forecast: self.spending_forecast(),
        }
    }
}

/// Twelve zero months ending at the month of `today`
fn fallback_trend(today: NaiveDate) -> Vec<TrendDataPoint> {
    let current = MonthKey::from_date(today);
    (0..FALLBACK_TREND_MONTHS)
        .map(|i| TrendDataPoint::zero(current.offset(i - (FALLBACK_TREND_MONTHS - 1))))
        .collect()
}
