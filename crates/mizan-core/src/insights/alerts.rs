//! Alert Generator
//!
//! Compares this calendar week with the previous one, category by category,
//! and adds one alert for the week's compliance ratio. Alerts keep the order
//! categories come out of the aggregator, with the compliance alert last, and
//! the list is cut to the first `max_alerts` entries without re-sorting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::aggregate::SpendingWindow;
use crate::config::InsightConfig;

use super::types::{money, whole, AlertKind, AlertSeverity, SpendingAlert};

/// Category label used for the compliance alert
pub const COMPLIANCE_CATEGORY: &str = "Compliance";

/// Percent change from `prior` to `current`; a rise from nothing counts as 100%
///
/// Saturates at `Decimal::MAX` / `Decimal::MIN` when the change is too large
/// to represent (e.g. a sub-cent prior).
pub fn percent_change(current: Decimal, prior: Decimal) -> Decimal {
    if prior <= Decimal::ZERO {
        return Decimal::ONE_HUNDRED;
    }

    let diff = current.saturating_sub(prior);
    diff.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(prior))
        .or_else(|| {
            diff.checked_div(prior)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        })
        .unwrap_or(if diff.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

/// Builds week-over-week spending alerts
pub struct AlertGenerator {
    config: InsightConfig,
}

impl AlertGenerator {
    pub fn new() -> Self {
        Self::with_config(InsightConfig::default())
    }

    pub fn with_config(config: InsightConfig) -> Self {
        Self { config }
    }

    /// Alerts for `current` (this week) against `prior` (last week)
    pub fn generate(
        &self,
        current: &SpendingWindow,
        prior: &SpendingWindow,
        generated_at: DateTime<Utc>,
    ) -> Vec<SpendingAlert> {
        let mut alerts: Vec<SpendingAlert> = current
            .categories
            .iter()
            .filter(|entry| !entry.amount.is_zero())
            .filter_map(|entry| {
                self.category_alert(
                    &entry.category,
                    entry.amount,
                    prior.categories.get(&entry.category),
                    generated_at,
                )
            })
            .collect();

        if let Some(alert) = self.compliance_alert(current.compliance_ratio(), generated_at) {
            alerts.push(alert);
        }

        alerts.truncate(self.config.max_alerts);
        alerts
    }

    /// Alert for one category, first matching rule wins
    pub fn category_alert(
        &self,
        category: &str,
        current: Decimal,
        prior: Decimal,
        generated_at: DateTime<Utc>,
    ) -> Option<SpendingAlert> {
        let change = percent_change(current, prior);
        let cfg = &self.config;

        let (kind, severity, message) = if change > cfg.alert_critical_increase_percent
            && current > cfg.alert_min_current_amount
        {
            (
                AlertKind::SpendingIncrease,
                AlertSeverity::Critical,
                format!(
                    "{} spending jumped {}% this week ({} vs {} last week)",
                    category,
                    whole(change),
                    money(current),
                    money(prior)
                ),
            )
        } else if change > cfg.alert_caution_increase_percent
            && current > cfg.alert_min_current_amount
        {
            (
                AlertKind::SpendingIncrease,
                AlertSeverity::Caution,
                format!(
                    "{} spending is up {}% this week ({} vs {} last week)",
                    category,
                    whole(change),
                    money(current),
                    money(prior)
                ),
            )
        } else if change < cfg.alert_decrease_percent {
            (
                AlertKind::SpendingDecrease,
                AlertSeverity::Positive,
                format!(
                    "{} spending is down {}% from last week ({} vs {})",
                    category,
                    whole(change.abs()),
                    money(current),
                    money(prior)
                ),
            )
        } else {
            return None;
        };

        Some(SpendingAlert {
            kind,
            category: category.to_string(),
            severity,
            message,
            value: current,
            percent_change: Some(change),
            generated_at,
        })
    }

    /// At most one alert for the week's compliance percentage
    pub fn compliance_alert(&self, ratio: u32, generated_at: DateTime<Utc>) -> Option<SpendingAlert> {
        let cfg = &self.config;

        let (severity, message) = if ratio < cfg.compliance_alert_critical_below {
            (
                AlertSeverity::Critical,
                format!(
                    "Only {}% of this week's transactions were compliant",
                    ratio
                ),
            )
        } else if ratio < cfg.compliance_alert_caution_below {
            (
                AlertSeverity::Caution,
                format!(
                    "{}% of this week's transactions were compliant; review the rest",
                    ratio
                ),
            )
        } else if ratio >= cfg.compliance_alert_positive_from {
            (
                AlertSeverity::Positive,
                format!("{}% of this week's transactions were compliant", ratio),
            )
        } else {
            return None;
        };

        Some(SpendingAlert {
            kind: AlertKind::Compliance,
            category: COMPLIANCE_CATEGORY.to_string(),
            severity,
            message,
            value: Decimal::from(ratio),
            percent_change: None,
            generated_at,
        })
    }
}

impl Default for AlertGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Aggregator, WindowPolicy};
    use crate::models::{ComplianceStatus, Transaction};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        // Wednesday
        Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap()
    }

    fn tx(category: &str, amount: Decimal, days_ago: i64, status: ComplianceStatus) -> Transaction {
        Transaction {
            id: format!("{}-{}-{}", category, amount, days_ago),
            merchant_name: category.to_string(),
            merchant_code: "0000".to_string(),
            amount,
            timestamp: now() - Duration::days(days_ago),
            status,
            category: category.to_string(),
        }
    }

    fn weeks(history: &[Transaction]) -> (SpendingWindow, SpendingWindow) {
        let agg = Aggregator::default();
        (
            agg.window(history, now(), WindowPolicy::this_week()),
            agg.window(history, now(), WindowPolicy::last_week()),
        )
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(dec!(151), dec!(100)), dec!(51));
        assert_eq!(percent_change(dec!(79), dec!(100)), dec!(-21));
        assert_eq!(percent_change(dec!(42), Decimal::ZERO), dec!(100));
    }

    #[test]
    fn test_sub_cent_prior_saturates() {
        let tiny = dec!(0.0000000000000000000000000001);
        assert_eq!(percent_change(dec!(1000), tiny), Decimal::MAX);
        assert_eq!(percent_change(Decimal::MAX, dec!(0.5)), Decimal::MAX);

        let alert = AlertGenerator::new()
            .category_alert("Groceries", dec!(1000), tiny, now())
            .unwrap();
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert!(alert.message.contains("$0.00 last week"));
    }

    #[test]
    fn test_critical_increase_needs_amount_above_100() {
        let gen = AlertGenerator::new();
        let alert = gen
            .category_alert("Dining", dec!(151), dec!(100), now())
            .unwrap();
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.kind, AlertKind::SpendingIncrease);
        assert_eq!(alert.percent_change, Some(dec!(51)));

        // +51% but only 75.5 spent
        assert!(gen
            .category_alert("Dining", dec!(75.5), dec!(50), now())
            .is_none());
        // exactly 100 is not above 100
        assert!(gen
            .category_alert("Dining", dec!(100), dec!(60), now())
            .is_none());
    }

    #[test]
    fn test_caution_increase() {
        let gen = AlertGenerator::new();
        let alert = gen
            .category_alert("Fuel", dec!(140), dec!(100), now())
            .unwrap();
        assert_eq!(alert.severity, AlertSeverity::Caution);
        // +30% exactly is not above 30
        assert!(gen.category_alert("Fuel", dec!(130), dec!(100), now()).is_none());
    }

    #[test]
    fn test_decrease_boundary() {
        let gen = AlertGenerator::new();
        let alert = gen
            .category_alert("Dining", dec!(79), dec!(100), now())
            .unwrap();
        assert_eq!(alert.severity, AlertSeverity::Positive);
        assert_eq!(alert.kind, AlertKind::SpendingDecrease);
        assert!(alert.message.contains("down 21%"));

        assert!(gen.category_alert("Dining", dec!(80), dec!(100), now()).is_none());
    }

    #[test]
    fn test_compliance_bands() {
        let gen = AlertGenerator::new();
        assert_eq!(
            gen.compliance_alert(49, now()).unwrap().severity,
            AlertSeverity::Critical
        );
        assert_eq!(
            gen.compliance_alert(50, now()).unwrap().severity,
            AlertSeverity::Caution
        );
        assert!(gen.compliance_alert(70, now()).is_none());
        assert!(gen.compliance_alert(89, now()).is_none());
        let alert = gen.compliance_alert(90, now()).unwrap();
        assert_eq!(alert.severity, AlertSeverity::Positive);
        assert_eq!(alert.category, COMPLIANCE_CATEGORY);
        assert_eq!(alert.value, dec!(90));
    }

    #[test]
    fn test_groceries_week_over_week() {
        let history = vec![
            tx("Groceries", dec!(160), 1, ComplianceStatus::Compliant),
            tx("Groceries", dec!(100), 7, ComplianceStatus::Compliant),
        ];
        let (current, prior) = weeks(&history);
        let alerts = AlertGenerator::new().generate(&current, &prior, now());

        let category_alerts: Vec<_> = alerts
            .iter()
            .filter(|a| a.kind != AlertKind::Compliance)
            .collect();
        assert_eq!(category_alerts.len(), 1);
        assert_eq!(category_alerts[0].category, "Groceries");
        assert_eq!(category_alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(category_alerts[0].percent_change, Some(dec!(60)));
        assert!(alerts.len() <= 2);
    }

    #[test]
    fn test_new_category_counts_as_full_increase() {
        let history = vec![tx("Travel", dec!(300), 0, ComplianceStatus::Unclassified)];
        let (current, prior) = weeks(&history);
        let alerts = AlertGenerator::new().generate(&current, &prior, now());
        assert_eq!(alerts[0].category, "Travel");
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].percent_change, Some(dec!(100)));
        // 0% compliant this week
        assert_eq!(alerts[1].kind, AlertKind::Compliance);
        assert_eq!(alerts[1].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_truncates_to_five_in_aggregator_order() {
        let mut history = Vec::new();
        for name in ["A", "B", "C", "D", "E", "F"] {
            history.push(tx(name, dec!(500), 1, ComplianceStatus::NonCompliant));
        }
        let (current, prior) = weeks(&history);
        let alerts = AlertGenerator::new().generate(&current, &prior, now());

        assert_eq!(alerts.len(), 5);
        let names: Vec<&str> = alerts.iter().map(|a| a.category.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "D", "E"]);
        // The compliance alert was cut off by truncation
        assert!(alerts.iter().all(|a| a.kind != AlertKind::Compliance));
    }

    #[test]
    fn test_generate_is_idempotent() {
        let history = vec![
            tx("Groceries", dec!(160), 1, ComplianceStatus::Compliant),
            tx("Dining", dec!(30), 1, ComplianceStatus::Unclassified),
            tx("Groceries", dec!(100), 8, ComplianceStatus::Compliant),
            tx("Dining", dec!(90), 8, ComplianceStatus::Compliant),
        ];
        let gen = AlertGenerator::new();
        let (current, prior) = weeks(&history);
        let first = gen.generate(&current, &prior, now());
        let (current, prior) = weeks(&history);
        let second = gen.generate(&current, &prior, now());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
