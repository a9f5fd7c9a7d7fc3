//! Mizan Core Library
//!
//! Compliance-aware spending analysis:
//! - Merchant classification by keyword and merchant category code
//! - Calendar and rolling windowed aggregation
//! - Week-over-week alerts, monthly recommendations and anomaly detection
//! - Rule files with embedded defaults
//! - CSV ingestion and JSON histories

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod import;
pub mod insights;
pub mod models;

pub use aggregate::{
    compliance_ratio, count_by_status, sum_by_category, Aggregator, CalendarUnit, CategoryTotal,
    CategoryTotals, RollingSpan, SpendingWindow, StatusCounts, WindowPolicy,
};
pub use classifier::{Classification, MerchantClassifier, RuleSet, RuleStage, DEFAULT_CATEGORY};
pub use config::{default_config_path, ConfigSource, InsightConfig, MizanConfig};
pub use error::{Error, Result};
pub use import::{load_history, parse_csv, read_json, write_json};
pub use insights::{
    AiRecommendation, AlertSeverity, Anomaly, AnomalySeverity, InsightEngine, InsightReport,
    SpendingAlert,
};
pub use models::{ComplianceStatus, HistoryOrder, RawTransaction, Transaction};
