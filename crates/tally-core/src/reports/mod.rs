//! Time-windowed aggregation
//!
//! Turns a transaction snapshot into the chart-ready views: the trailing
//! spending trend, the month-by-month overview, category and merchant
//! breakdowns, and the current-vs-previous month comparison.
//!
//! Windows are inclusive on both ends. Records with a non-finite amount are
//! skipped with a warning rather than poisoning a total.

mod categories;
mod merchants;
mod trends;

pub use categories::{category_spending, detailed_category_spending};
pub use merchants::merchant_spending;
pub use trends::{monthly_trends, spending_overview, spending_trend, InvestmentRule};

pub(crate) use categories::{expense_totals_by_category, zero_categories};

use tracing::warn;

use crate::error::{Error, Result};
use crate::models::{DateWindow, Transaction};

/// Reject windows whose start is after their end.
///
/// `DateWindow::new` already refuses these, but the fields are public.
pub(crate) fn check_window(window: &DateWindow) -> Result<()> {
    if window.start > window.end {
        return Err(Error::InvalidWindow {
            start: window.start,
            end: window.end,
        });
    }
    Ok(())
}

/// Magnitude of a record, logging and returning `None` when it is unusable
pub(crate) fn usable_amount(tx: &Transaction) -> Option<f64> {
    let amount = tx.magnitude();
    if amount.is_none() {
        warn!(transaction = %tx.id, "Skipping transaction with non-finite amount");
    }
    amount
}

/// Expenses dated inside the window
pub(crate) fn expenses_in<'a>(
    transactions: &'a [Transaction],
    window: &'a DateWindow,
) -> impl Iterator<Item = &'a Transaction> + 'a {
    transactions
        .iter()
        .filter(move |t| t.is_expense() && window.contains(t.date))
}
