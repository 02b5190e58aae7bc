//! Recurring transaction detection
//!
//! Finds subscriptions, rent, payroll-style debits and other repeating
//! charges purely from descriptions, amounts, and dates:
//!
//! - **grouping** - buckets expenses by (merchant key, exact amount) and
//!   computes day gaps with their mean and standard deviation
//! - **classifier** - turns gap statistics into a cadence
//! - **detector** - runs both and projects the next charge date
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_core::recurring::RecurringDetector;
//!
//! let detector = RecurringDetector::new(&config)?;
//! let candidates = detector.detect(&transactions);
//! ```

pub mod classifier;
pub mod detector;
pub mod grouping;

pub use classifier::{classify, FrequencyClassifier};
pub use detector::{candidate_id, detect, projected_next_date, RecurringDetector};
pub use grouping::{group_transactions, TransactionGroup};
