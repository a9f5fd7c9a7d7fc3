//! Recommendation Generator
//!
//! Builds up to four recommendations from the current calendar month, always
//! in this order: budget for the top category, compliance, daily spending
//! target, and the week's anomaly. Each step contributes zero or one entry.

use rust_decimal::Decimal;

use crate::aggregate::SpendingWindow;
use crate::config::InsightConfig;

use super::types::{money, whole, AiRecommendation, Anomaly, AnomalySeverity, RecommendationKind};

/// Category label used for month-wide recommendations
pub const OVERALL_CATEGORY: &str = "Overall";

/// Builds month-level recommendations
pub struct RecommendationGenerator {
    config: InsightConfig,
}

impl RecommendationGenerator {
    pub fn new() -> Self {
        Self::with_config(InsightConfig::default())
    }

    pub fn with_config(config: InsightConfig) -> Self {
        Self { config }
    }

    pub fn generate(&self, month: &SpendingWindow, anomaly: Option<&Anomaly>) -> Vec<AiRecommendation> {
        [
            self.budget(month),
            self.compliance(month.compliance_ratio()),
            self.daily_target(month.total()),
            anomaly.map(|a| self.anomaly(a)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Budget advice for the highest-spend category
    pub fn budget(&self, month: &SpendingWindow) -> Option<AiRecommendation> {
        let ranked = month.categories.ranked();
        let top = ranked.into_iter().take(self.config.top_categories).next()?;
        let cfg = &self.config;

        let (title, factor) = if top.amount > cfg.budget_high_spend {
            (format!("Cut back on {}", top.category), cfg.budget_high_factor)
        } else if top.amount > cfg.budget_min_spend {
            (format!("Trim {} spending", top.category), cfg.budget_factor)
        } else {
            return None;
        };

        let budget = top.amount.saturating_mul(factor);
        let reduction = Decimal::ONE
            .saturating_sub(factor)
            .saturating_mul(Decimal::ONE_HUNDRED);

        Some(AiRecommendation {
            title,
            description: format!(
                "{} is your largest category this month at {}. Try a budget of {} ({}% less).",
                top.category,
                money(top.amount),
                money(budget),
                whole(reduction)
            ),
            category: top.category.clone(),
            kind: RecommendationKind::Budget,
        })
    }

    /// Advice keyed to the month's compliance percentage
    pub fn compliance(&self, ratio: u32) -> Option<AiRecommendation> {
        let cfg = &self.config;

        let (title, description) = if ratio < cfg.compliance_rec_critical_below {
            (
                "Review non-compliant spending",
                format!(
                    "Only {}% of this month's transactions were compliant. Look for compliant alternatives to the merchants you use most.",
                    ratio
                ),
            )
        } else if ratio < cfg.compliance_rec_caution_below {
            (
                "Improve your compliance",
                format!(
                    "{}% of this month's transactions were compliant. Check unclassified merchants and switch where you can.",
                    ratio
                ),
            )
        } else if ratio >= cfg.compliance_rec_positive_from {
            (
                "Keep up the compliant spending",
                format!(
                    "{}% of this month's transactions were compliant. Nice work.",
                    ratio
                ),
            )
        } else {
            return None;
        };

        Some(AiRecommendation {
            title: title.to_string(),
            description,
            category: "Compliance".to_string(),
            kind: RecommendationKind::Compliance,
        })
    }

    /// Daily spending target from the month total
    pub fn daily_target(&self, month_total: Decimal) -> Option<AiRecommendation> {
        if month_total <= Decimal::ZERO {
            return None;
        }
        let cfg = &self.config;

        let average_daily = month_total / Decimal::from(cfg.days_per_month.max(1));
        let target = average_daily.saturating_mul(cfg.daily_target_factor);

        let title = if average_daily > cfg.daily_high_average {
            "Lower your daily spending"
        } else {
            "Set a daily spending target"
        };

        Some(AiRecommendation {
            title: title.to_string(),
            description: format!(
                "You are averaging {} a day this month. Aim for {} a day.",
                money(average_daily),
                money(target)
            ),
            category: OVERALL_CATEGORY.to_string(),
            kind: RecommendationKind::DailyTarget,
        })
    }

    /// Recommendation for the detected anomaly
    pub fn anomaly(&self, anomaly: &Anomaly) -> AiRecommendation {
        let title = match anomaly.severity {
            AnomalySeverity::High => format!("Unusual spike in {}", anomaly.category),
            AnomalySeverity::Moderate => format!("{} spending is higher than usual", anomaly.category),
        };

        AiRecommendation {
            title,
            description: format!(
                "You spent {} on {} this week, {}x your weekly average of {}.",
                money(anomaly.amount),
                anomaly.category,
                anomaly.ratio.round_dp(1).normalize(),
                money(anomaly.baseline_average)
            ),
            category: anomaly.category.clone(),
            kind: RecommendationKind::Anomaly,
        }
    }
}

impl Default for RecommendationGenerator {
    fn default() -> Self {
        Self::new()
    }
}
