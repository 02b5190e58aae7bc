//! Analytics configuration
//!
//! Holds every tunable of the engine: normalizer rules, classifier
//! thresholds, detector limits, and report settings.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-layer resolution:
//! 1. An explicit path (e.g. `tally --config analytics.toml`)
//! 2. The user override in the data dir (~/.local/share/tally/config/analytics.toml)
//! 3. The embedded defaults (compiled into the binary)
//!
//! Keys missing from an override file fall back to the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::normalize::{builtin_rules, NormalizeRule};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

/// Top-level analytics configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub normalizer: NormalizerConfig,
    pub classifier: ClassifierConfig,
    pub detector: DetectorConfig,
    pub reports: ReportsConfig,
}

/// Merchant normalizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Ordered (pattern, replacement) rules applied to the uppercased description
    pub rules: Vec<NormalizeRule>,
    /// Maximum number of words kept in a merchant key
    pub max_tokens: usize,
    /// Key returned when nothing survives normalization
    pub fallback_key: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            rules: builtin_rules(),
            max_tokens: 3,
            fallback_key: "unknown_merchant".to_string(),
        }
    }
}

/// Inclusive range of mean day gaps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapRange {
    pub min: f64,
    pub max: f64,
}

impl GapRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Frequency classifier thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Absolute std-dev ceiling inside the weekly band
    pub weekly_max_std_dev: f64,
    /// Std-dev ceiling as a fraction of the mean gap
    pub relative_std_dev_ratio: f64,
    /// Floor for the relative std-dev ceiling
    pub min_std_dev_threshold: f64,
    /// Std-dev ceiling for consistent groups outside the standard bands
    pub other_max_std_dev: f64,
    pub weekly: GapRange,
    pub monthly: GapRange,
    pub quarterly: GapRange,
    pub annually: GapRange,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            weekly_max_std_dev: 2.5,
            relative_std_dev_ratio: 0.15,
            min_std_dev_threshold: 3.5,
            other_max_std_dev: 2.0,
            weekly: GapRange::new(6.0, 9.0),
            monthly: GapRange::new(27.0, 33.0),
            quarterly: GapRange::new(85.0, 95.0),
            annually: GapRange::new(350.0, 380.0),
        }
    }
}

/// Recurring detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Minimum transactions per (merchant, amount) group. Values below 3 are raised to 3.
    pub min_group_size: usize,
}

impl DetectorConfig {
    /// Group size actually enforced (two gaps need three transactions)
    pub fn effective_min_group_size(&self) -> usize {
        self.min_group_size.max(3)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self { min_group_size: 3 }
    }
}

/// Report settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Buckets in the trailing spending trend
    pub trailing_months: u32,
    /// How far back the overview reaches when history is shorter
    pub overview_lookback_months: u32,
    /// Months projected by the spending forecast
    pub forecast_periods: u32,
    /// Description keywords marking an expense as an investment contribution
    pub investment_keywords: Vec<String>,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            trailing_months: 12,
            overview_lookback_months: 12,
            forecast_periods: 3,
            investment_keywords: [
                "investment",
                "brokerage",
                "401k",
                "roth ira",
                "vanguard",
                "fidelity",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl AnalyticsConfig {
    /// Parse the embedded default configuration
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Parse configuration from a TOML string and validate it
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration (explicit path, then user override, then embedded)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        match path {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "Loading analytics config");
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&content)
            }
            Some(path) => {
                if override_path.is_some() {
                    warn!(path = %path.display(), "Config file not found, using defaults");
                }
                Self::embedded()
            }
            None => Self::embedded(),
        }
    }

    /// Check that thresholds are usable
    pub fn validate(&self) -> Result<()> {
        if self.normalizer.max_tokens == 0 {
            return Err(Error::Config(
                "normalizer.max_tokens must be at least 1".to_string(),
            ));
        }
        if self.normalizer.fallback_key.trim().is_empty() {
            return Err(Error::Config(
                "normalizer.fallback_key must not be empty".to_string(),
            ));
        }

        let c = &self.classifier;
        for (name, range) in [
            ("weekly", c.weekly),
            ("monthly", c.monthly),
            ("quarterly", c.quarterly),
            ("annually", c.annually),
        ] {
            if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
                return Err(Error::Config(format!(
                    "classifier.{} range is invalid ({} > {})",
                    name, range.min, range.max
                )));
            }
        }
        for (name, value) in [
            ("weekly_max_std_dev", c.weekly_max_std_dev),
            ("relative_std_dev_ratio", c.relative_std_dev_ratio),
            ("min_std_dev_threshold", c.min_std_dev_threshold),
            ("other_max_std_dev", c.other_max_std_dev),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "classifier.{} must be a non-negative number",
                    name
                )));
            }
        }

        if self.reports.trailing_months == 0 {
            return Err(Error::Config(
                "reports.trailing_months must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("analytics.toml"))
}
