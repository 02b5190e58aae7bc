//! Frequency classification from gap statistics

use crate::config::ClassifierConfig;
use crate::models::{Cadence, Classification};

/// Maps (mean gap, gap std-dev) to a cadence
#[derive(Debug, Clone, Default)]
pub struct FrequencyClassifier {
    config: ClassifierConfig,
}

impl FrequencyClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Whether the gaps are regular enough to be a recurrence.
    ///
    /// Short cadences get an absolute threshold: a relative one (15% of ~7
    /// days) would reject ordinary weekend drift.
    pub fn is_consistent(&self, mean_gap: f64, std_dev_gap: f64) -> bool {
        let c = &self.config;
        if c.weekly.contains(mean_gap) && std_dev_gap < c.weekly_max_std_dev {
            return true;
        }
        std_dev_gap < (mean_gap * c.relative_std_dev_ratio).max(c.min_std_dev_threshold)
    }

    pub fn classify(&self, mean_gap: f64, std_dev_gap: f64) -> Classification {
        if !self.is_consistent(mean_gap, std_dev_gap) {
            return Classification {
                is_consistent: false,
                cadence: Cadence::Inconsistent,
            };
        }

        let c = &self.config;
        let cadence = if c.monthly.contains(mean_gap) {
            Cadence::Monthly
        } else if c.weekly.contains(mean_gap) {
            Cadence::Weekly
        } else if c.quarterly.contains(mean_gap) {
            Cadence::Quarterly
        } else if c.annually.contains(mean_gap) {
            Cadence::Annually
        } else if std_dev_gap < c.other_max_std_dev {
            Cadence::Other
        } else {
            Cadence::Inconsistent
        };

        Classification {
            is_consistent: true,
            cadence,
        }
    }
}

/// Classify with the default thresholds
pub fn classify(mean_gap: f64, std_dev_gap: f64) -> Classification {
    FrequencyClassifier::default().classify(mean_gap, std_dev_gap)
}
