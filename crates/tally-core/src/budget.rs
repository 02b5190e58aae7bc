//! Budget variance for a window

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::Result;
use crate::models::{
    BudgetReport, BudgetVariance, Category, DateWindow, Transaction, TransactionKind,
    UnbudgetedCategory,
};
use crate::reports::{check_window, expense_totals_by_category};

/// Compare one category's actual spend against its budget.
///
/// `variance_percentage` is 0 for a zero budget.
pub fn budget_variance(category: &str, budget: f64, actual: f64) -> BudgetVariance {
    let variance = budget - actual;
    let variance_percentage = if budget == 0.0 {
        0.0
    } else {
        variance / budget * 100.0
    };

    BudgetVariance {
        category: category.to_string(),
        budget,
        actual,
        variance,
        variance_percentage,
        is_over_budget: actual > budget,
    }
}

/// Budget vs actual for every expense category, in name order.
///
/// Categories with no usable budget are listed separately with their actual
/// spend.
pub fn budget_variances(
    transactions: &[Transaction],
    categories: &[Category],
    window: &DateWindow,
) -> Result<BudgetReport> {
    check_window(window)?;

    let (actuals, _) = expense_totals_by_category(transactions, window);

    let expense_categories: BTreeMap<&str, Option<f64>> = categories
        .iter()
        .filter(|c| c.kind == TransactionKind::Expense)
        .map(|c| (c.name.as_str(), c.budget))
        .collect();

    let mut report = BudgetReport::default();
    for (name, budget) in expense_categories {
        let actual = actuals.get(name).copied().unwrap_or(0.0);
        match budget {
            Some(budget) if budget.is_finite() => {
                report.variances.push(budget_variance(name, budget, actual));
            }
            Some(_) => {
                warn!(category = name, "Ignoring non-finite budget");
                report.unbudgeted.push(UnbudgetedCategory {
                    category: name.to_string(),
                    actual,
                });
            }
            None => report.unbudgeted.push(UnbudgetedCategory {
                category: name.to_string(),
                actual,
            }),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window() -> DateWindow {
        DateWindow::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap()
    }

    #[test]
    fn test_budget_variance_math() {
        let under = budget_variance("Food", 600.0, 450.0);
        assert_eq!(under.variance, 150.0);
        assert_eq!(under.variance_percentage, 25.0);
        assert!(!under.is_over_budget);

        let over = budget_variance("Food", 200.0, 250.0);
        assert_eq!(over.variance, -50.0);
        assert_eq!(over.variance_percentage, -25.0);
        assert!(over.is_over_budget);

        let zero = budget_variance("Gifts", 0.0, 30.0);
        assert_eq!(zero.variance_percentage, 0.0);
        assert!(zero.is_over_budget);
    }

    #[test]
    fn test_report_splits_budgeted_and_unbudgeted() {
        let categories = vec![
            Category::new("food", "Food", TransactionKind::Expense, Some(600.0)),
            Category::new("fun", "Fun", TransactionKind::Expense, Some(100.0)),
            Category::new("rent", "Rent", TransactionKind::Expense, None),
            Category::new("salary", "Salary", TransactionKind::Income, Some(5000.0)),
        ];
        let txs = vec![
            Transaction::expense("a", date(2024, 1, 3), 500.0, "Food", "GROCER"),
            Transaction::expense("b", date(2024, 1, 4), 1200.0, "Rent", "LANDLORD"),
            Transaction::expense("c", date(2024, 2, 4), 80.0, "Fun", "CINEMA"),
            Transaction::income("d", date(2024, 1, 15), 5000.0, "Salary", "PAYROLL"),
        ];

        let report = budget_variances(&txs, &categories, &window()).unwrap();

        let names: Vec<&str> = report.variances.iter().map(|v| v.category.as_str()).collect();
        assert_eq!(names, vec!["Food", "Fun"]);
        assert_eq!(report.variances[0].actual, 500.0);
        assert_eq!(report.variances[1].actual, 0.0);
        assert_eq!(report.variances[1].variance_percentage, 100.0);

        assert_eq!(
            report.unbudgeted,
            vec![UnbudgetedCategory {
                category: "Rent".to_string(),
                actual: 1200.0,
            }]
        );
    }

    #[test]
    fn test_non_finite_budget_is_unbudgeted() {
        let categories = vec![Category::new(
            "food",
            "Food",
            TransactionKind::Expense,
            Some(f64::NAN),
        )];
        let report = budget_variances(&[], &categories, &window()).unwrap();
        assert!(report.variances.is_empty());
        assert_eq!(report.unbudgeted.len(), 1);
    }

    #[test]
    fn test_empty_inputs() {
        let report = budget_variances(&[], &[], &window()).unwrap();
        assert_eq!(report, BudgetReport::default());
    }
}
