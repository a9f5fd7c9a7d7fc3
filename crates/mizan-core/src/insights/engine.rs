//! Insight Engine - cuts the calendar windows and runs the generators

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::aggregate::{Aggregator, SpendingWindow, WindowPolicy};
use crate::config::InsightConfig;
use crate::models::Transaction;

use super::alerts::AlertGenerator;
use super::anomaly::AnomalyDetector;
use super::recommendations::RecommendationGenerator;
use super::types::{AiRecommendation, Anomaly, InsightReport, SpendingAlert};

/// Calendar windows the insights are computed from
#[derive(Debug, Clone)]
pub struct InsightWindows {
    pub this_week: SpendingWindow,
    pub last_week: SpendingWindow,
    pub this_month: SpendingWindow,
    pub last_month: SpendingWindow,
}

/// Produces alerts, recommendations and anomalies from a transaction history
pub struct InsightEngine {
    aggregator: Aggregator,
    alerts: AlertGenerator,
    recommendations: RecommendationGenerator,
    detector: AnomalyDetector,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Engine with default thresholds over a newest-first history in UTC
    pub fn new() -> Self {
        Self::with_config(Aggregator::default(), InsightConfig::default())
    }

    pub fn with_config(aggregator: Aggregator, config: InsightConfig) -> Self {
        Self {
            aggregator,
            detector: AnomalyDetector::from_config(&config),
            recommendations: RecommendationGenerator::with_config(config.clone()),
            alerts: AlertGenerator::with_config(config),
        }
    }

    /// This/last week and this/last month relative to `now`
    pub fn windows(&self, history: &[Transaction], now: DateTime<Utc>) -> InsightWindows {
        InsightWindows {
            this_week: self.aggregator.window(history, now, WindowPolicy::this_week()),
            last_week: self.aggregator.window(history, now, WindowPolicy::last_week()),
            this_month: self.aggregator.window(history, now, WindowPolicy::this_month()),
            last_month: self.aggregator.window(history, now, WindowPolicy::last_month()),
        }
    }

    /// Week-over-week alerts
    pub fn alerts(&self, history: &[Transaction], now: DateTime<Utc>) -> Vec<SpendingAlert> {
        let windows = self.windows(history, now);
        self.alerts
            .generate(&windows.this_week, &windows.last_week, now)
    }

    /// This week against the previous month's weekly baseline
    pub fn detect_anomaly(&self, history: &[Transaction], now: DateTime<Utc>) -> Option<Anomaly> {
        let windows = self.windows(history, now);
        self.detector
            .detect(&windows.this_week.categories, &windows.last_month.categories)
    }

    /// Month-level recommendations, including the anomaly if one is found
    pub fn recommendations(
        &self,
        history: &[Transaction],
        now: DateTime<Utc>,
    ) -> Vec<AiRecommendation> {
        self.analyze(history, now).recommendations
    }

    /// Run every generator against one reference instant
    pub fn analyze(&self, history: &[Transaction], now: DateTime<Utc>) -> InsightReport {
        let windows = self.windows(history, now);

        let anomaly = self
            .detector
            .detect(&windows.this_week.categories, &windows.last_month.categories);
        let alerts = self
            .alerts
            .generate(&windows.this_week, &windows.last_week, now);
        let recommendations = self
            .recommendations
            .generate(&windows.this_month, anomaly.as_ref());

        debug!(
            transactions = history.len(),
            alerts = alerts.len(),
            recommendations = recommendations.len(),
            anomaly = anomaly.is_some(),
            "Insight analysis complete"
        );

        InsightReport {
            generated_at: now,
            alerts,
            recommendations,
            anomaly,
        }
    }
}
