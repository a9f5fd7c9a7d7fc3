//! Data models for Mizan

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Compliance status assigned to a transaction by the merchant classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    Unclassified,
    NonCompliant,
}

impl ComplianceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::Unclassified => "unclassified",
            ComplianceStatus::NonCompliant => "non_compliant",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "Compliant",
            ComplianceStatus::Unclassified => "Unclassified",
            ComplianceStatus::NonCompliant => "Non-compliant",
        }
    }

    pub fn all() -> &'static [ComplianceStatus] {
        &[
            ComplianceStatus::Compliant,
            ComplianceStatus::Unclassified,
            ComplianceStatus::NonCompliant,
        ]
    }
}

impl std::str::FromStr for ComplianceStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compliant" => Ok(ComplianceStatus::Compliant),
            "unclassified" => Ok(ComplianceStatus::Unclassified),
            "non_compliant" | "non-compliant" | "noncompliant" => {
                Ok(ComplianceStatus::NonCompliant)
            }
            _ => Err(format!("Unknown compliance status: {}", s)),
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A classified financial transaction
///
/// Produced once at ingestion time and never mutated afterwards. Amount and
/// timestamp are authoritative for every aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub merchant_name: String,
    /// Merchant category code (e.g. "5411" for grocery stores)
    pub merchant_code: String,
    /// Spend amount, never negative
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub status: ComplianceStatus,
    /// Category label derived from the merchant code
    pub category: String,
}

/// A transaction as delivered by an export, before classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub merchant_name: String,
    pub merchant_code: String,
    pub amount: Decimal,
}

/// How a transaction history is ordered when handed to the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    /// Descending by timestamp (the order the transaction store delivers)
    #[default]
    NewestFirst,
    /// Ascending by timestamp
    OldestFirst,
    /// No particular order; the aggregator sorts a copy newest-first
    Unsorted,
}

impl HistoryOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryOrder::NewestFirst => "newest_first",
            HistoryOrder::OldestFirst => "oldest_first",
            HistoryOrder::Unsorted => "unsorted",
        }
    }
}

impl std::str::FromStr for HistoryOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "newest_first" | "newest-first" | "desc" => Ok(HistoryOrder::NewestFirst),
            "oldest_first" | "oldest-first" | "asc" => Ok(HistoryOrder::OldestFirst),
            "unsorted" => Ok(HistoryOrder::Unsorted),
            _ => Err(format!("Unknown history order: {}", s)),
        }
    }
}
