//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use tally_core::Analytics;
use tempfile::TempDir;

use crate::cli::{Cli, Commands};
use crate::commands::{self, truncate, Snapshot};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn setup_snapshot() -> (TempDir, Snapshot) {
    let dir = tempfile::tempdir().unwrap();
    let transactions = write_file(
        &dir,
        "transactions.csv",
        "date,description,amount,category
2024-01-05,NETFLIX.COM,-15.99,Entertainment
2024-02-05,NETFLIX.COM,-15.99,Entertainment
2024-03-05,NETFLIX.COM,-15.99,Entertainment
2024-03-10,GROCERY OUTLET,-82.40,Groceries
2024-03-15,ACME PAYROLL,2400.00,Salary
not-a-date,BROKEN ROW,-1.00,Groceries
",
    );
    let categories = write_file(
        &dir,
        "categories.csv",
        "name,kind,budget
Entertainment,expense,20
Groceries,expense,300
Salary,income,
",
    );

    let snapshot = commands::load_snapshot(&transactions, Some(categories.as_path())).unwrap();
    (dir, snapshot)
}

// ========== Snapshot Loading Tests ==========

#[test]
fn test_load_snapshot_skips_bad_rows() {
    let (_dir, snapshot) = setup_snapshot();
    assert_eq!(snapshot.transactions.len(), 5);
    assert_eq!(snapshot.categories.len(), 3);
}

#[test]
fn test_load_snapshot_without_categories() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "tx.json",
        r#"[{"id": "a", "date": "2024-01-01", "amount": 5.0, "category": "Food",
             "description": "CAFE", "kind": "expense"}]"#,
    );
    let snapshot = commands::load_snapshot(&path, None).unwrap();
    assert_eq!(snapshot.transactions.len(), 1);
    assert!(snapshot.categories.is_empty());
}

#[test]
fn test_load_snapshot_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = commands::load_snapshot(&dir.path().join("nope.csv"), None);
    assert!(result.is_err());
}

#[test]
fn test_load_config_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "analytics.toml", "[reports]\ntrailing_months = 6\n");
    let config = commands::load_config(Some(path.as_path())).unwrap();
    assert_eq!(config.reports.trailing_months, 6);
}

#[test]
fn test_resolve_today() {
    assert_eq!(
        commands::resolve_today(Some("2024-03-20")).unwrap(),
        date(2024, 3, 20)
    );
    assert!(commands::resolve_today(Some("03/20/2024")).is_err());
    assert!(commands::resolve_today(None).is_ok());
}

// ========== Period Tests ==========

#[test]
fn test_resolve_period_this_month() {
    let window = commands::resolve_period("this-month", None, None, date(2024, 2, 10)).unwrap();
    assert_eq!(window.start, date(2024, 2, 1));
    assert_eq!(window.end, date(2024, 2, 29));
}

#[test]
fn test_resolve_period_last_month() {
    let window = commands::resolve_period("last-month", None, None, date(2024, 1, 10)).unwrap();
    assert_eq!(window.start, date(2023, 12, 1));
    assert_eq!(window.end, date(2023, 12, 31));
}

#[test]
fn test_resolve_period_last_30_days() {
    let window = commands::resolve_period("last-30-days", None, None, date(2024, 3, 31)).unwrap();
    assert_eq!((window.end - window.start).num_days(), 30);
}

#[test]
fn test_resolve_period_last_90_days() {
    let window = commands::resolve_period("last-90-days", None, None, date(2024, 3, 31)).unwrap();
    assert_eq!((window.end - window.start).num_days(), 90);
}

#[test]
fn test_resolve_period_this_year() {
    let window = commands::resolve_period("this-year", None, None, date(2024, 6, 15)).unwrap();
    assert_eq!(window.start, date(2024, 1, 1));
    assert_eq!(window.end, date(2024, 6, 15));
}

#[test]
fn test_resolve_period_last_12_months() {
    let window =
        commands::resolve_period("last-12-months", None, None, date(2024, 6, 15)).unwrap();
    assert_eq!(window.start, date(2023, 6, 1));
}

#[test]
fn test_resolve_period_all_time() {
    let window = commands::resolve_period("all", None, None, date(2024, 6, 15)).unwrap();
    assert!(window.contains(date(1990, 1, 1)));
    assert!(window.contains(date(2030, 1, 1)));
}

#[test]
fn test_resolve_period_custom_range() {
    let window = commands::resolve_period(
        "this-month",
        Some("2024-01-01"),
        Some("2024-01-31"),
        date(2024, 6, 15),
    )
    .unwrap();
    assert_eq!(window.start, date(2024, 1, 1));
    assert_eq!(window.end, date(2024, 1, 31));
}

#[test]
fn test_resolve_period_errors() {
    let today = date(2024, 6, 15);
    assert!(commands::resolve_period("fortnight", None, None, today).is_err());
    assert!(commands::resolve_period("all", Some("2024-01-01"), None, today).is_err());
    assert!(
        commands::resolve_period("all", Some("2024-02-01"), Some("2024-01-01"), today).is_err()
    );
    assert!(commands::resolve_period("all", Some("1/1/2024"), Some("2024-01-31"), today).is_err());
}

// ========== Command Tests ==========

#[test]
fn test_report_commands_table_and_json() {
    let (_dir, snapshot) = setup_snapshot();
    let analytics = Analytics::new(
        &snapshot.transactions,
        &snapshot.categories,
        date(2024, 3, 20),
    );
    let window = commands::resolve_period("this-month", None, None, date(2024, 3, 20)).unwrap();

    for json in [false, true] {
        assert!(commands::cmd_trend(&analytics, json).is_ok());
        assert!(commands::cmd_overview(&analytics, json).is_ok());
        assert!(commands::cmd_categories(&analytics, window, json).is_ok());
        assert!(commands::cmd_drilldown(&analytics, window, json).is_ok());
        assert!(commands::cmd_merchants(&analytics, window, 5, json).is_ok());
        assert!(commands::cmd_monthly(&analytics, json).is_ok());
        assert!(commands::cmd_budget(&analytics, window, json).is_ok());
        assert!(commands::cmd_forecast(&analytics, json).is_ok());
        assert!(commands::cmd_recurring(&analytics, false, json).is_ok());
        assert!(commands::cmd_recurring(&analytics, true, json).is_ok());
    }
    assert!(commands::cmd_dashboard(&analytics, window).is_ok());
}

#[test]
fn test_commands_on_empty_snapshot() {
    let analytics = Analytics::new(&[], &[], date(2024, 3, 20));
    let window = commands::resolve_period("all", None, None, date(2024, 3, 20)).unwrap();

    assert!(commands::cmd_categories(&analytics, window, false).is_ok());
    assert!(commands::cmd_budget(&analytics, window, false).is_ok());
    assert!(commands::cmd_recurring(&analytics, false, false).is_ok());
    assert!(commands::cmd_dashboard(&analytics, window).is_ok());
}

#[test]
fn test_snapshot_detects_recurring() {
    let (_dir, snapshot) = setup_snapshot();
    let analytics = Analytics::new(
        &snapshot.transactions,
        &snapshot.categories,
        date(2024, 3, 20),
    );
    let candidates = analytics.potential_recurring_transactions();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].merchant_key, "netflixcom");
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_cli_parses_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "tally",
        "merchants",
        "--limit",
        "3",
        "--period",
        "last-month",
        "--transactions",
        "tx.json",
        "--json",
    ])
    .unwrap();

    assert!(cli.json);
    assert_eq!(cli.transactions, PathBuf::from("tx.json"));
    match cli.command {
        Commands::Merchants { period, limit } => {
            assert_eq!(limit, 3);
            assert_eq!(period.period, "last-month");
        }
        _ => panic!("Expected merchants command"),
    }
}

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from(["tally", "recurring"]).unwrap();
    assert_eq!(cli.transactions, PathBuf::from("transactions.csv"));
    assert!(cli.categories.is_none());
    assert!(!cli.json);
    assert!(matches!(cli.command, Commands::Recurring { all: false }));
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a long string that exceeds", 10), "a long ...");
    assert_eq!(truncate("exact", 5), "exact");
    assert_eq!(truncate("toolong", 6), "too...");
    assert_eq!(truncate("cafés à paris", 8), "cafés...");
}
