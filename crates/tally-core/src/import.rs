//! Snapshot import from CSV and JSON
//!
//! Transactions CSV: `id,date,description,amount,category,kind` (header row
//! required, column order free, `id`, `category` and `kind` optional).
//! Without a `kind` column a negative amount is an expense and anything else
//! is income. Amounts are stored as magnitudes.
//!
//! Categories CSV: `id,name,kind,budget` (`id`, `kind` and `budget` optional).
//!
//! JSON files hold an array of records in the serialized model shape. In both
//! formats a bad row is logged and skipped; only an unreadable file fails.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{Category, Transaction, TransactionKind};

/// Row counts from one import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub imported: usize,
    pub skipped: usize,
}

/// Parsed records plus what was skipped along the way
#[derive(Debug, Clone, PartialEq)]
pub struct Imported<T> {
    pub records: Vec<T>,
    pub stats: ImportStats,
}

impl<T> Imported<T> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            stats: ImportStats::default(),
        }
    }

    fn push(&mut self, record: T) {
        self.records.push(record);
        self.stats.imported += 1;
    }

    fn skip(&mut self, row: usize, error: &Error) {
        warn!(row, error = %error, "Skipping unparseable row");
        self.stats.skipped += 1;
    }
}

/// Parse a date in `YYYY-MM-DD`, `MM/DD/YYYY` or `MM/DD/YY` form
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    // chrono's %Y also takes "24", so slash formats are picked by year width
    let formats = [
        ("%Y-%m-%d", None),    // 2024-01-15
        ("%m/%d/%Y", Some(4)), // 01/15/2024
        ("%m/%d/%y", Some(2)), // 01/15/24
    ];
    let year_digits = s.rsplit('/').next().map(str::len);

    for (fmt, width) in formats {
        if width.is_some_and(|w| Some(w) != year_digits) {
            continue;
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::InvalidData(format!("Unable to parse date: {}", s)))
}

/// Parse an amount, handling currency symbols, thousands separators and
/// accounting-style parentheses
pub fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    match cleaned.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(Error::InvalidData(format!("Unable to parse amount: {}", s))),
    }
}

/// Stable id for a row that did not carry one.
///
/// The row index keeps identical same-day purchases apart.
fn generate_id(date: &NaiveDate, description: &str, amount: f64, row: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.to_be_bytes());
    hasher.update(row.to_be_bytes());
    hex::encode(hasher.finalize())
}

fn column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn required_column(headers: &StringRecord, name: &str) -> Result<usize> {
    column(headers, name)
        .ok_or_else(|| Error::InvalidData(format!("Missing required column: {}", name)))
}

/// Non-empty trimmed field
fn field<'r>(record: &'r StringRecord, index: Option<usize>) -> Option<&'r str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn required_field<'r>(record: &'r StringRecord, index: usize, name: &str) -> Result<&'r str> {
    field(record, Some(index)).ok_or_else(|| Error::InvalidData(format!("Missing {}", name)))
}

struct TransactionColumns {
    id: Option<usize>,
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
    kind: Option<usize>,
}

impl TransactionColumns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        Ok(Self {
            id: column(headers, "id"),
            date: required_column(headers, "date")?,
            description: required_column(headers, "description")?,
            amount: required_column(headers, "amount")?,
            category: column(headers, "category"),
            kind: column(headers, "kind"),
        })
    }

    fn parse(&self, record: &StringRecord, row: usize) -> Result<Transaction> {
        let date = parse_date(required_field(record, self.date, "date")?)?;
        let description = required_field(record, self.description, "description")?;
        let signed = parse_amount(required_field(record, self.amount, "amount")?)?;

        let kind = match field(record, self.kind) {
            Some(kind) => kind.parse::<TransactionKind>().map_err(Error::InvalidData)?,
            None if signed < 0.0 => TransactionKind::Expense,
            None => TransactionKind::Income,
        };

        let id = match field(record, self.id) {
            Some(id) => id.to_string(),
            None => generate_id(&date, description, signed, row),
        };

        Ok(Transaction::new(
            id,
            date,
            signed.abs(),
            field(record, self.category).unwrap_or_default(),
            description,
            kind,
        ))
    }
}

/// Parse a transactions CSV
pub fn parse_transactions_csv<R: Read>(reader: R) -> Result<Imported<Transaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = TransactionColumns::from_headers(rdr.headers()?)?;
    let mut imported = Imported::new();

    for (row, result) in rdr.records().enumerate() {
        match result
            .map_err(Error::from)
            .and_then(|record| columns.parse(&record, row))
        {
            Ok(tx) => imported.push(tx),
            Err(e) => imported.skip(row, &e),
        }
    }

    debug!(
        imported = imported.stats.imported,
        skipped = imported.stats.skipped,
        "Parsed transactions CSV"
    );
    Ok(imported)
}

/// Parse a categories CSV
pub fn parse_categories_csv<R: Read>(reader: R) -> Result<Imported<Category>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let id_col = column(&headers, "id");
    let name_col = required_column(&headers, "name")?;
    let kind_col = column(&headers, "kind");
    let budget_col = column(&headers, "budget");

    let parse = |record: &StringRecord| -> Result<Category> {
        let name = required_field(record, name_col, "name")?;
        let kind = match field(record, kind_col) {
            Some(kind) => kind.parse::<TransactionKind>().map_err(Error::InvalidData)?,
            None => TransactionKind::Expense,
        };
        let budget = field(record, budget_col).map(parse_amount).transpose()?;
        let id = field(record, id_col)
            .map(str::to_string)
            .unwrap_or_else(|| name.to_lowercase());
        Ok(Category::new(id, name, kind, budget))
    };

    let mut imported = Imported::new();
    for (row, result) in rdr.records().enumerate() {
        match result.map_err(Error::from).and_then(|r| parse(&r)) {
            Ok(category) => imported.push(category),
            Err(e) => imported.skip(row, &e),
        }
    }

    debug!(
        imported = imported.stats.imported,
        skipped = imported.stats.skipped,
        "Parsed categories CSV"
    );
    Ok(imported)
}

/// Parse a JSON array of records, skipping elements that do not deserialize
pub fn parse_json_records<T: DeserializeOwned, R: Read>(reader: R) -> Result<Imported<T>> {
    let values: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    let mut imported = Imported::new();

    for (row, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(record) => imported.push(record),
            Err(e) => imported.skip(row, &Error::from(e)),
        }
    }

    Ok(imported)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// Load transactions from a `.json` file or, for any other extension, CSV
pub fn load_transactions(path: &Path) -> Result<Imported<Transaction>> {
    let reader = open(path)?;
    let imported = if is_json(path) {
        parse_json_records(reader)?
    } else {
        parse_transactions_csv(reader)?
    };

    info!(
        path = %path.display(),
        imported = imported.stats.imported,
        skipped = imported.stats.skipped,
        "Loaded transactions"
    );
    Ok(imported)
}

/// Load categories from a `.json` file or, for any other extension, CSV
pub fn load_categories(path: &Path) -> Result<Imported<Category>> {
    let reader = open(path)?;
    let imported = if is_json(path) {
        parse_json_records(reader)?
    } else {
        parse_categories_csv(reader)?
    };

    info!(
        path = %path.display(),
        imported = imported.stats.imported,
        skipped = imported.stats.skipped,
        "Loaded categories"
    );
    Ok(imported)
}
