//! Rule set and threshold configuration
//!
//! Config is loaded with a layered resolution:
//! 1. An explicit path (e.g. `mizan --rules my-rules.toml`), which must exist
//! 2. An override in the data dir (~/.local/share/mizan/config/rules.toml)
//! 3. Embedded defaults (config/rules.toml, compiled into the binary)
//!
//! The first layer found is used as a whole; layers are not merged. Within a
//! file, an omitted `[thresholds]` key keeps its default value.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::{RuleSet, DEFAULT_CATEGORY};
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
pub const DEFAULT_RULES: &str = include_str!("../../../config/rules.toml");

/// Thresholds used by the insight generators
///
/// Defaults are the production rules: alerts at +50% / +30% / -20% week over
/// week, anomalies at 3x / 2x the weekly baseline, budget advice above 500.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InsightConfig {
    // Category alerts (current week vs prior week)
    /// Percent increase above which an increase is Critical
    pub alert_critical_increase_percent: Decimal,
    /// Percent increase above which an increase is Caution
    pub alert_caution_increase_percent: Decimal,
    /// Percent change below which a decrease is Positive
    pub alert_decrease_percent: Decimal,
    /// Current-week spend an increase must exceed to alert
    pub alert_min_current_amount: Decimal,
    /// Maximum number of alerts returned
    pub max_alerts: usize,

    // Weekly compliance alert
    pub compliance_alert_critical_below: u32,
    pub compliance_alert_caution_below: u32,
    pub compliance_alert_positive_from: u32,

    // Anomaly detection
    pub anomaly_high_ratio: Decimal,
    pub anomaly_moderate_ratio: Decimal,
    pub anomaly_min_amount: Decimal,
    /// Number of weekly buckets the prior month is divided into
    pub anomaly_baseline_buckets: u32,

    // Recommendations (current month)
    /// Number of top categories ranked for budget advice
    pub top_categories: usize,
    pub budget_min_spend: Decimal,
    pub budget_high_spend: Decimal,
    pub budget_high_factor: Decimal,
    pub budget_factor: Decimal,
    pub compliance_rec_critical_below: u32,
    pub compliance_rec_caution_below: u32,
    pub compliance_rec_positive_from: u32,
    /// Divisor turning a month total into a daily average
    pub days_per_month: u32,
    pub daily_target_factor: Decimal,
    /// Daily average above which the daily target is worded as a reduction
    pub daily_high_average: Decimal,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            alert_critical_increase_percent: Decimal::from(50),
            alert_caution_increase_percent: Decimal::from(30),
            alert_decrease_percent: Decimal::from(-20),
            alert_min_current_amount: Decimal::from(100),
            max_alerts: 5,
            compliance_alert_critical_below: 50,
            compliance_alert_caution_below: 70,
            compliance_alert_positive_from: 90,
            anomaly_high_ratio: Decimal::from(3),
            anomaly_moderate_ratio: Decimal::from(2),
            anomaly_min_amount: Decimal::from(200),
            anomaly_baseline_buckets: 4,
            top_categories: 3,
            budget_min_spend: Decimal::from(500),
            budget_high_spend: Decimal::from(1000),
            budget_high_factor: Decimal::new(7, 1),
            budget_factor: Decimal::new(8, 1),
            compliance_rec_critical_below: 50,
            compliance_rec_caution_below: 80,
            compliance_rec_positive_from: 90,
            days_per_month: 30,
            daily_target_factor: Decimal::new(9, 1),
            daily_high_average: Decimal::from(100),
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Embedded,
    File(PathBuf),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Embedded => write!(f, "embedded defaults"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fully resolved configuration: classification rules plus insight thresholds
#[derive(Debug, Clone)]
pub struct MizanConfig {
    pub rules: RuleSet,
    pub thresholds: InsightConfig,
    pub source: ConfigSource,
}

impl MizanConfig {
    /// Parse the embedded default rules
    pub fn embedded() -> Result<Self> {
        let (rules, thresholds) = parse_config(DEFAULT_RULES)?;
        Ok(Self {
            rules,
            thresholds,
            source: ConfigSource::Embedded,
        })
    }

    /// Load config, preferring an explicit path, then the data-dir override
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Rules file not found: {}",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        if let Some(default_path) = default_config_path() {
            if default_path.exists() {
                return Self::from_file(&default_path);
            }
        }

        Self::embedded()
    }

    /// Load config from a specific TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let (rules, thresholds) = parse_config(&content)?;
        debug!(path = %path.display(), "Loaded rule override");
        Ok(Self {
            rules,
            thresholds,
            source: ConfigSource::File(path.to_path_buf()),
        })
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("mizan").join("config").join("rules.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    compliance: Option<RawCompliance>,
    categories: Option<RawCategories>,
    thresholds: Option<InsightConfig>,
    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

/// Known sections reject misspelled keys; unknown top-level sections only warn
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCompliance {
    compliant_keywords: Option<Vec<String>>,
    non_compliant_keywords: Option<Vec<String>>,
    compliant_codes: Option<Vec<String>>,
    non_compliant_codes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCategories {
    default: Option<String>,
    codes: Option<BTreeMap<String, String>>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<(RuleSet, InsightConfig)> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid rules TOML: {}", e)))?;

    for key in raw.unknown.keys() {
        warn!(section = key.as_str(), "Ignoring unknown section in rules config");
    }

    let mut rules = RuleSet::empty();

    if let Some(compliance) = raw.compliance {
        rules = rules
            .with_compliant_keywords(compliance.compliant_keywords.unwrap_or_default())
            .with_non_compliant_keywords(compliance.non_compliant_keywords.unwrap_or_default())
            .with_compliant_codes(compliance.compliant_codes.unwrap_or_default())
            .with_non_compliant_codes(compliance.non_compliant_codes.unwrap_or_default());
    }

    if let Some(categories) = raw.categories {
        rules = rules.with_default_category(
            categories
                .default
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        );
        for (code, label) in categories.codes.unwrap_or_default() {
            rules = rules.with_category(&code, label);
        }
    }

    let overlap: Vec<&String> = rules
        .compliant_codes()
        .intersection(rules.non_compliant_codes())
        .collect();
    if !overlap.is_empty() {
        return Err(Error::Config(format!(
            "Codes listed as both compliant and non-compliant: {:?}",
            overlap
        )));
    }

    let thresholds = raw.thresholds.unwrap_or_default();

    debug!(
        compliant_codes = rules.compliant_codes().len(),
        non_compliant_codes = rules.non_compliant_codes().len(),
        compliant_keywords = rules.compliant_keywords().len(),
        non_compliant_keywords = rules.non_compliant_keywords().len(),
        categories = rules.categories().len(),
        "Parsed classification rules"
    );

    Ok((rules, thresholds))
}
