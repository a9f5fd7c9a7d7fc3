//! Anomaly Detector
//!
//! Compares this week's spend per category with a weekly baseline taken from
//! the previous calendar month (the month total divided into weekly buckets).
//! Reports only the first category, in aggregator order, that crosses a
//! threshold, not the most severe one.

use rust_decimal::Decimal;
use tracing::debug;

use crate::aggregate::CategoryTotals;
use crate::config::InsightConfig;

use super::types::{Anomaly, AnomalySeverity};

/// Flags a category whose weekly spend is a multiple of its baseline
pub struct AnomalyDetector {
    high_ratio: Decimal,
    moderate_ratio: Decimal,
    min_amount: Decimal,
    baseline_buckets: u32,
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self::from_config(&InsightConfig::default())
    }

    pub fn from_config(config: &InsightConfig) -> Self {
        Self {
            high_ratio: config.anomaly_high_ratio,
            moderate_ratio: config.anomaly_moderate_ratio,
            min_amount: config.anomaly_min_amount,
            baseline_buckets: config.anomaly_baseline_buckets.max(1),
        }
    }

    /// Weekly average for a category from the look-back window
    pub fn baseline_average(&self, baseline: &CategoryTotals, category: &str) -> Decimal {
        baseline.get(category) / Decimal::from(self.baseline_buckets)
    }

    /// `current / baseline`, or zero when there is no baseline.
    /// Saturates at `Decimal::MAX` for a vanishingly small baseline.
    pub fn ratio(current: Decimal, baseline_average: Decimal) -> Decimal {
        if baseline_average.is_zero() {
            Decimal::ZERO
        } else {
            current
                .checked_div(baseline_average)
                .unwrap_or(Decimal::MAX)
        }
    }

    /// First category crossing an anomaly threshold
    ///
    /// `current` holds this period's sums; `lookback` holds the sums of the
    /// longer window the baseline average is computed from.
    pub fn detect(&self, current: &CategoryTotals, lookback: &CategoryTotals) -> Option<Anomaly> {
        for entry in current {
            let baseline_average = self.baseline_average(lookback, &entry.category);
            let ratio = Self::ratio(entry.amount, baseline_average);

            let severity = if ratio > self.high_ratio && entry.amount > self.min_amount {
                AnomalySeverity::High
            } else if ratio > self.moderate_ratio && entry.amount > self.min_amount {
                AnomalySeverity::Moderate
            } else {
                continue;
            };

            debug!(
                category = entry.category.as_str(),
                severity = severity.as_str(),
                ratio = %ratio,
                "Spending anomaly detected"
            );

            return Some(Anomaly {
                category: entry.category.clone(),
                amount: entry.amount,
                baseline_average,
                ratio,
                severity,
            });
        }

        None
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}
