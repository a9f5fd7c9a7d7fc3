//! Core types for the Insight Engine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity tier of a spending alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Good news (spending down, compliance high)
    Positive,
    /// Worth attention
    Caution,
    /// Should be addressed
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Positive => "positive",
            AlertSeverity::Caution => "caution",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(AlertSeverity::Positive),
            "caution" => Ok(AlertSeverity::Caution),
            "critical" => Ok(AlertSeverity::Critical),
            _ => Err(format!("Unknown alert severity: {}", s)),
        }
    }
}

/// What an alert is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    SpendingIncrease,
    SpendingDecrease,
    Compliance,
}

/// A spending alert for the current week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingAlert {
    pub kind: AlertKind,
    /// Category label, or "Compliance" for the compliance alert
    pub category: String,
    pub severity: AlertSeverity,
    pub message: String,
    /// Current-week spend for category alerts, compliance percentage otherwise
    pub value: Decimal,
    /// Week-over-week change for category alerts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_change: Option<Decimal>,
    /// Reference instant the alert was generated for
    pub generated_at: DateTime<Utc>,
}

/// Presentation hint for a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Budget,
    Compliance,
    DailyTarget,
    Anomaly,
}

impl RecommendationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationKind::Budget => "budget",
            RecommendationKind::Compliance => "compliance",
            RecommendationKind::DailyTarget => "daily_target",
            RecommendationKind::Anomaly => "anomaly",
        }
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An advisory recommendation for the current month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiRecommendation {
    pub title: String,
    pub description: String,
    pub category: String,
    pub kind: RecommendationKind,
}

/// Severity of a detected anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    Moderate,
    High,
}

impl AnomalySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalySeverity::Moderate => "moderate",
            AnomalySeverity::High => "high",
        }
    }
}

impl fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A category whose spend this week is far above its weekly baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    pub category: String,
    pub amount: Decimal,
    pub baseline_average: Decimal,
    pub ratio: Decimal,
    pub severity: AnomalySeverity,
}

/// Everything the insight engine produces for one reference instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightReport {
    pub generated_at: DateTime<Utc>,
    pub alerts: Vec<SpendingAlert>,
    pub recommendations: Vec<AiRecommendation>,
    pub anomaly: Option<Anomaly>,
}

/// Format a money amount with two decimals
pub(crate) fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// Format a percentage as a whole number
pub(crate) fn whole(value: Decimal) -> String {
    value.round_dp(0).normalize().to_string()
}
