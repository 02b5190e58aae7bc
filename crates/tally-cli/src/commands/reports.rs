//! Report command implementations

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use tally_core::models::{DateWindow, MonthKey, TrendComparison};
use tally_core::Analytics;

use super::{parse_date_arg, print_json, truncate};

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

/// Resolve a period name, or an explicit --from/--to pair, to a window
/// relative to `today`
pub fn resolve_period(
    period: &str,
    custom_from: Option<&str>,
    custom_to: Option<&str>,
    today: NaiveDate,
) -> Result<DateWindow> {
    match (custom_from, custom_to) {
        (Some(from), Some(to)) => {
            let from = parse_date_arg(from, "--from")?;
            let to = parse_date_arg(to, "--to")?;
            return DateWindow::new(from, to).context("--from must not be after --to");
        }
        (Some(_), None) | (None, Some(_)) => bail!("--from and --to must be given together"),
        (None, None) => {}
    }

    let current = MonthKey::from_date(today);
    let window = match period.to_lowercase().as_str() {
        "this-month" => current.window()?,
        "last-month" => current.prev().window()?,
        "this-year" => {
            let from = NaiveDate::from_ymd_opt(today.year(), 1, 1)
                .context("Reference date is out of range")?;
            DateWindow::new(from, today)?
        }
        "last-30-days" => trailing_days(today, 30)?,
        "last-90-days" => trailing_days(today, 90)?,
        "last-12-months" => {
            let from = current
                .offset(-12)
                .first_day()
                .context("Reference date is out of range")?;
            DateWindow::new(from, today)?
        }
        "all" => DateWindow::new(NaiveDate::MIN, NaiveDate::MAX)?,
        _ => bail!("Unknown period: {}. Available: this-month, last-month, this-year, last-30-days, last-90-days, last-12-months, all", period),
    };

    Ok(window)
}

fn trailing_days(today: NaiveDate, days: i64) -> Result<DateWindow> {
    let from = today
        .checked_sub_signed(Duration::days(days))
        .context("Reference date is out of range")?;
    Ok(DateWindow::new(from, today)?)
}

fn describe_window(window: &DateWindow) -> String {
    if window.start == NaiveDate::MIN && window.end == NaiveDate::MAX {
        "all time".to_string()
    } else {
        window.to_string()
    }
}

fn format_change(comparison: &TrendComparison) -> String {
    format!("{:+.1}%", comparison.percent_change)
}

pub fn cmd_trend(analytics: &Analytics, json: bool) -> Result<()> {
    let trend = analytics.spending_trend();
    if json {
        return print_json(&trend);
    }

    println!();
    println!("📈 Spending Trend");
    println!("{}", RULE);
    println!("   {:12} │ {:>10} │ {:>5}", "Period", "Amount", "Count");
    println!("   ─────────────┼────────────┼───────");

    for point in &trend {
        println!(
            "   {:12} │ {:>10.2} │ {:>5}",
            point.period, point.amount, point.transaction_count
        );
    }

    let total_amount: f64 = trend.iter().map(|p| p.amount).sum();
    let total_count: usize = trend.iter().map(|p| p.transaction_count).sum();
    let avg_amount = if trend.is_empty() {
        0.0
    } else {
        total_amount / trend.len() as f64
    };

    println!("   ─────────────┼────────────┼───────");
    println!(
        "   {:12} │ {:>10.2} │ {:>5}",
        "Total", total_amount, total_count
    );
    println!("   {:12} │ {:>10.2} │", "Average", avg_amount);

    Ok(())
}

pub fn cmd_overview(analytics: &Analytics, json: bool) -> Result<()> {
    let overview = analytics.spending_overview();
    if json {
        return print_json(&overview);
    }

    println!();
    println!("📅 Monthly Overview");
    println!("{}", RULE);
    println!(
        "   {:12} │ {:>10} │ {:>10} │ {:>10}",
        "Period", "Spending", "Income", "Net"
    );
    println!("   ─────────────┼────────────┼────────────┼────────────");

    for month in &overview {
        println!(
            "   {:12} │ {:>10.2} │ {:>10.2} │ {:>10.2}",
            month.period,
            month.total_spending,
            month.total_income,
            month.total_income - month.total_spending
        );
    }

    Ok(())
}

pub fn cmd_categories(analytics: &Analytics, window: DateWindow, json: bool) -> Result<()> {
    let categories = analytics.category_spending(Some(window));
    if json {
        return print_json(&categories);
    }

    println!();
    println!("📊 Spending by Category");
    println!("   Period: {}", describe_window(&window));
    println!("{}", RULE);

    if categories.iter().all(|c| c.value == 0.0) {
        println!("   No spending found in this period.");
        return Ok(());
    }

    let total: f64 = categories.iter().map(|c| c.value).sum();
    println!("   Total: ${:.2}", total);
    println!();
    println!(
        "   {:25} │ {:>10} │ {:>10} │ {:>6}",
        "Category", "Amount", "Budget", "%"
    );
    println!("   ──────────────────────────┼────────────┼────────────┼────────");

    for category in &categories {
        let budget = category
            .target
            .map(|b| format!("{:.2}", b))
            .unwrap_or_else(|| "-".to_string());
        let share = if total > 0.0 {
            category.value / total * 100.0
        } else {
            0.0
        };
        println!(
            "   {:25} │ {:>10.2} │ {:>10} │ {:>5.1}%",
            truncate(&category.name, 25),
            category.value,
            budget,
            share
        );
    }

    Ok(())
}

pub fn cmd_drilldown(analytics: &Analytics, window: DateWindow, json: bool) -> Result<()> {
    let details = analytics.detailed_category_spending(Some(window));
    if json {
        return print_json(&details);
    }

    println!();
    println!("🔎 Category Drill-down");
    println!("   Period: {}", describe_window(&window));
    println!("{}", RULE);

    if details.is_empty() {
        println!("   No spending found in this period.");
        return Ok(());
    }

    for detail in &details {
        println!();
        println!("   {} (${:.2})", detail.category, detail.total);
        for item in &detail.items {
            println!(
                "     {} │ {:35} │ {:>10.2}",
                item.date,
                truncate(&item.description, 35),
                item.amount
            );
        }
    }

    Ok(())
}

pub fn cmd_merchants(
    analytics: &Analytics,
    window: DateWindow,
    limit: usize,
    json: bool,
) -> Result<()> {
    let merchants = analytics.merchant_spending(Some(window), Some(limit));
    if json {
        return print_json(&merchants);
    }

    println!();
    println!("🏪 Top Merchants");
    println!("   Period: {}", describe_window(&window));
    println!("{}", RULE);

    if merchants.is_empty() {
        println!("   No spending found.");
        return Ok(());
    }

    println!(
        "   {:3} │ {:30} │ {:>10} │ {:>5}",
        "#", "Merchant", "Amount", "Count"
    );
    println!("   ────┼────────────────────────────────┼────────────┼───────");

    for (i, merchant) in merchants.iter().enumerate() {
        println!(
            "   {:>3} │ {:30} │ {:>10.2} │ {:>5}",
            i + 1,
            truncate(&merchant.merchant, 30),
            merchant.total,
            merchant.transaction_count
        );
    }

    Ok(())
}

pub fn cmd_monthly(analytics: &Analytics, json: bool) -> Result<()> {
    let trends = analytics.monthly_trends();
    if json {
        return print_json(&trends);
    }

    println!();
    println!(
        "🗓️  {} vs {}",
        trends.current_month, trends.previous_month
    );
    println!("{}", RULE);
    println!(
        "   {:25} │ {:>10} │ {:>10} │ {:>8}",
        "", "Current", "Previous", "Change"
    );
    println!("   ──────────────────────────┼────────────┼────────────┼──────────");

    let totals = [
        ("Spending", &trends.spending),
        ("Income", &trends.income),
        ("Net savings", &trends.net_savings),
    ];
    for (label, comparison) in totals {
        println!(
            "   {:25} │ {:>10.2} │ {:>10.2} │ {:>8}",
            label,
            comparison.current,
            comparison.previous,
            format_change(comparison)
        );
    }

    if !trends.categories.is_empty() {
        println!("   ──────────────────────────┼────────────┼────────────┼──────────");
        for category in &trends.categories {
            println!(
                "   {:25} │ {:>10.2} │ {:>10.2} │ {:>8}",
                truncate(&category.category, 25),
                category.comparison.current,
                category.comparison.previous,
                format_change(&category.comparison)
            );
        }
    }

    Ok(())
}

pub fn cmd_budget(analytics: &Analytics, window: DateWindow, json: bool) -> Result<()> {
    let report = analytics.budget_variances(Some(window));
    if json {
        return print_json(&report);
    }

    println!();
    println!("💰 Budget vs Actual");
    println!("   Period: {}", describe_window(&window));
    println!("{}", RULE);

    if report.variances.is_empty() && report.unbudgeted.is_empty() {
        println!("   No expense categories configured.");
        println!("   Pass a categories file with: tally --categories <FILE> budget");
        return Ok(());
    }

    if !report.variances.is_empty() {
        println!(
            "   {:20} │ {:>10} │ {:>10} │ {:>10} │ {:>7}",
            "Category", "Budget", "Actual", "Left", "%"
        );
        println!("   ─────────────────────┼────────────┼────────────┼────────────┼─────────");
        for v in &report.variances {
            let icon = if v.is_over_budget { "⚠️ " } else { "  " };
            println!(
                "   {:20} │ {:>10.2} │ {:>10.2} │ {:>10.2} │ {:>6.1}% {}",
                truncate(&v.category, 20),
                v.budget,
                v.actual,
                v.variance,
                v.variance_percentage,
                icon
            );
        }
    }

    if !report.unbudgeted.is_empty() {
        println!();
        println!("   No budget set:");
        for u in &report.unbudgeted {
            println!("      {:20} {:>10.2}", truncate(&u.category, 20), u.actual);
        }
    }

    Ok(())
}

pub fn cmd_forecast(analytics: &Analytics, json: bool) -> Result<()> {
    let forecast = analytics.spending_forecast();
    if json {
        return print_json(&forecast);
    }

    println!();
    println!("🔮 Spending Forecast");
    println!(
        "   Trend: {:+.2}/month (baseline {:.2})",
        forecast.trend.slope, forecast.trend.intercept
    );
    println!("{}", RULE);

    if forecast.points.is_empty() {
        println!("   Not enough history to forecast.");
        return Ok(());
    }

    println!("   {:12} │ {:>10}", "Period", "Projected");
    println!("   ─────────────┼────────────");
    for point in &forecast.points {
        println!("   {:12} │ {:>10.2}", point.period, point.amount);
    }

    Ok(())
}

/// Every view as one JSON document (always JSON)
pub fn cmd_dashboard(analytics: &Analytics, window: DateWindow) -> Result<()> {
    print_json(&analytics.dashboard(Some(window)))
}
