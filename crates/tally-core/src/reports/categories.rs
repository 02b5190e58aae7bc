//! Category breakdowns for a window

use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use crate::models::{
    Category, CategoryAggregate, CategoryDetail, CategoryDetailItem, DateWindow, Transaction,
};

use super::{check_window, expenses_in, usable_amount};

/// Expense totals per category name in the window, plus how many records
/// contributed.
pub(crate) fn expense_totals_by_category(
    transactions: &[Transaction],
    window: &DateWindow,
) -> (BTreeMap<String, f64>, usize) {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut matched = 0;

    for tx in expenses_in(transactions, window) {
        let Some(amount) = usable_amount(tx) else {
            continue;
        };
        *totals.entry(tx.category_name().to_string()).or_insert(0.0) += amount;
        matched += 1;
    }

    (totals, matched)
}

fn budgets_by_name(categories: &[Category]) -> HashMap<&str, Option<f64>> {
    categories
        .iter()
        .map(|c| (c.name.as_str(), c.budget))
        .collect()
}

/// Every known category at zero, sorted by name
pub(crate) fn zero_categories(categories: &[Category]) -> Vec<CategoryAggregate> {
    let unique: BTreeMap<&str, Option<f64>> = categories
        .iter()
        .map(|c| (c.name.as_str(), c.budget))
        .collect();

    unique
        .into_iter()
        .map(|(name, budget)| CategoryAggregate {
            name: name.to_string(),
            value: 0.0,
            target: budget,
        })
        .collect()
}

/// Expense total per category in the window, with the category's budget as
/// target.
///
/// When nothing in the window matches, every known category is returned at
/// zero (sorted by name) so charts keep their legend. Otherwise results are
/// sorted by value descending, then name.
pub fn category_spending(
    transactions: &[Transaction],
    categories: &[Category],
    window: &DateWindow,
) -> Result<Vec<CategoryAggregate>> {
    check_window(window)?;

    let (totals, matched) = expense_totals_by_category(transactions, window);
    if matched == 0 {
        return Ok(zero_categories(categories));
    }

    let budgets = budgets_by_name(categories);
    let mut result: Vec<CategoryAggregate> = totals
        .into_iter()
        .map(|(name, value)| {
            let target = budgets.get(name.as_str()).copied().flatten();
            CategoryAggregate {
                name,
                value,
                target,
            }
        })
        .collect();

    result.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    Ok(result)
}

/// The raw expense rows behind each category total, oldest first within a
/// category. Categories are ordered like [`category_spending`].
pub fn detailed_category_spending(
    transactions: &[Transaction],
    window: &DateWindow,
) -> Result<Vec<CategoryDetail>> {
    check_window(window)?;

    let mut details: BTreeMap<String, CategoryDetail> = BTreeMap::new();

    for tx in expenses_in(transactions, window) {
        let Some(amount) = usable_amount(tx) else {
            continue;
        };
        let name = tx.category_name();
        let detail = details
            .entry(name.to_string())
            .or_insert_with(|| CategoryDetail {
                category: name.to_string(),
                total: 0.0,
                items: Vec::new(),
            });
        detail.total += amount;
        detail.items.push(CategoryDetailItem {
            transaction_id: tx.id.clone(),
            date: tx.date,
            description: tx.description.clone(),
            amount,
        });
    }

    let mut result: Vec<CategoryDetail> = details.into_values().collect();
    for detail in &mut result {
        detail.items.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.transaction_id.cmp(&b.transaction_id))
        });
    }
    result.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january() -> DateWindow {
        DateWindow::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap()
    }

    fn categories() -> Vec<Category> {
        vec![
            Category::new("food", "Food", TransactionKind::Expense, Some(600.0)),
            Category::new("rent", "Rent", TransactionKind::Expense, None),
            Category::new("salary", "Salary", TransactionKind::Income, None),
        ]
    }

    #[test]
    fn test_food_against_budget() {
        let txs = vec![Transaction::expense(
            "t1",
            date(2024, 1, 10),
            500.0,
            "Food",
            "GROCER",
        )];

        let result = category_spending(&txs, &categories(), &january()).unwrap();
        assert_eq!(
            result,
            vec![CategoryAggregate {
                name: "Food".to_string(),
                value: 500.0,
                target: Some(600.0),
            }]
        );
    }

    #[test]
    fn test_empty_window_lists_every_category_at_zero() {
        let txs = vec![Transaction::expense(
            "t1",
            date(2024, 2, 10),
            500.0,
            "Food",
            "GROCER",
        )];

        let result = category_spending(&txs, &categories(), &january()).unwrap();
        let names: Vec<&str> = result.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Food", "Rent", "Salary"]);
        assert!(result.iter().all(|c| c.value == 0.0));
        assert_eq!(result[0].target, Some(600.0));

        assert!(category_spending(&[], &[], &january()).unwrap().is_empty());
    }

    #[test]
    fn test_sorted_by_value_then_name() {
        let txs = vec![
            Transaction::expense("a", date(2024, 1, 2), 50.0, "Fuel", "SHELL"),
            Transaction::expense("b", date(2024, 1, 3), 50.0, "Coffee", "CAFE"),
            Transaction::expense("c", date(2024, 1, 4), 900.0, "Rent", "LANDLORD"),
            Transaction::expense("d", date(2024, 1, 5), 10.0, "", "MYSTERY"),
        ];

        let result = category_spending(&txs, &categories(), &january()).unwrap();
        let names: Vec<&str> = result.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Coffee", "Fuel", "Uncategorized"]);
        assert_eq!(result[0].target, None);
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let txs = vec![
            Transaction::expense("a", date(2024, 1, 1), 1.0, "Food", "FIRST"),
            Transaction::expense("b", date(2024, 1, 31), 2.0, "Food", "LAST"),
            Transaction::expense("c", date(2023, 12, 31), 4.0, "Food", "BEFORE"),
            Transaction::expense("d", date(2024, 2, 1), 8.0, "Food", "AFTER"),
        ];

        let result = category_spending(&txs, &categories(), &january()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].value, 3.0);
    }

    #[test]
    fn test_income_is_not_category_spending() {
        let txs = vec![
            Transaction::income("a", date(2024, 1, 15), 3000.0, "Salary", "PAYROLL"),
            Transaction::expense("b", date(2024, 1, 16), 20.0, "Food", "CAFE"),
        ];
        let result = category_spending(&txs, &categories(), &january()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Food");
    }

    #[test]
    fn test_inverted_window_is_an_error() {
        let window = DateWindow {
            start: date(2024, 2, 1),
            end: date(2024, 1, 1),
        };
        assert!(category_spending(&[], &categories(), &window).is_err());
        assert!(detailed_category_spending(&[], &window).is_err());
    }

    #[test]
    fn test_detailed_rows() {
        let txs = vec![
            Transaction::expense("b", date(2024, 1, 20), 30.0, "Food", "CAFE"),
            Transaction::expense("a", date(2024, 1, 5), 70.0, "Food", "GROCER"),
            Transaction::expense("c", date(2024, 1, 7), 40.0, "Fuel", "SHELL"),
            Transaction::expense("x", date(2024, 1, 8), f64::INFINITY, "Fuel", "BAD"),
        ];

        let details = detailed_category_spending(&txs, &january()).unwrap();
        assert_eq!(details.len(), 2);

        assert_eq!(details[0].category, "Food");
        assert_eq!(details[0].total, 100.0);
        let ids: Vec<&str> = details[0]
            .items
            .iter()
            .map(|i| i.transaction_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(details[0].items[1].description, "CAFE");

        assert_eq!(details[1].category, "Fuel");
        assert_eq!(details[1].items.len(), 1);
    }
}
