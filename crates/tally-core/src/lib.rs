//! Tally Core Library
//!
//! Analytics engine for the Tally personal finance tool:
//! - Merchant-name normalization from free-text descriptions
//! - Recurring transaction detection (grouping, gap statistics, cadence)
//! - Time-windowed spending and income aggregates
//! - Linear spending forecast and budget variance
//! - CSV/JSON snapshot import
//! - TOML configuration with an embedded default
//!
//! Everything is a pure function of its inputs. The reference date is passed
//! in explicitly; nothing here reads the clock except
//! [`Analytics::for_today`].

pub mod analytics;
pub mod budget;
pub mod config;
pub mod error;
pub mod forecast;
pub mod import;
pub mod models;
pub mod normalize;
pub mod recurring;
pub mod reports;

pub use analytics::{Analytics, Dashboard};
pub use config::{AnalyticsConfig, ClassifierConfig, DetectorConfig, NormalizerConfig, ReportsConfig};
pub use error::{Error, Result};
pub use forecast::{fit_linear, forecast_months, SpendingForecaster};
pub use import::{ImportStats, Imported};
pub use models::*;
pub use normalize::{normalize, MerchantNormalizer, NormalizeRule};
pub use recurring::{FrequencyClassifier, RecurringDetector};
pub use reports::InvestmentRule;
