//! Insight Engine - week and month spending insights
//!
//! Every insight is recomputed from the full classified history and an
//! explicit reference instant; nothing is cached between calls.
//!
//! ## Insight Types
//!
//! - **Alerts** - week-over-week category changes plus the week's compliance
//! - **Anomaly** - a category far above its weekly baseline from last month
//! - **Recommendations** - budget, compliance, daily target and anomaly advice
//!   for the current month
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mizan_core::insights::InsightEngine;
//!
//! let engine = InsightEngine::new();
//! let report = engine.analyze(&history, chrono::Utc::now());
//! ```

pub mod alerts;
pub mod anomaly;
pub mod engine;
pub mod recommendations;
pub mod types;

pub use alerts::{percent_change, AlertGenerator, COMPLIANCE_CATEGORY};
pub use anomaly::AnomalyDetector;
pub use engine::{InsightEngine, InsightWindows};
pub use recommendations::{RecommendationGenerator, OVERALL_CATEGORY};
pub use types::{
    AiRecommendation, AlertKind, AlertSeverity, Anomaly, AnomalySeverity, InsightReport,
    RecommendationKind, SpendingAlert,
};
