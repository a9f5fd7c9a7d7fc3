//! Shared command utilities

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use mizan_core::{
    load_history, Aggregator, HistoryOrder, MerchantClassifier, MizanConfig, Transaction,
};

/// Resolve the active rules: --rules, then the data-dir override, then embedded
pub fn load_config(rules: Option<&Path>) -> Result<MizanConfig> {
    let config = MizanConfig::load(rules).context("Failed to load classification rules")?;
    tracing::debug!(source = %config.source, "Using classification rules");
    Ok(config)
}

/// Convert --utc-offset minutes into a fixed offset
pub fn parse_utc_offset(minutes: i32) -> Result<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .with_context(|| format!("Invalid --utc-offset: {} minutes", minutes))
}

/// Parse --now, defaulting to the current time
pub fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|ts| ts.with_timezone(&Utc))
            .with_context(|| format!("Invalid --now timestamp (use RFC 3339): {}", s)),
        None => Ok(Utc::now()),
    }
}

/// Load a history file, classifying CSV input with the active rules
pub fn open_history(config: &MizanConfig, file: &Path) -> Result<Vec<Transaction>> {
    let classifier = MerchantClassifier::new(&config.rules);
    let history = load_history(file, &classifier)
        .with_context(|| format!("Failed to load history from {}", file.display()))?;
    tracing::debug!(count = history.len(), "Loaded history");
    Ok(history)
}

/// Aggregator for a history file in the declared --order
pub fn aggregator(order: HistoryOrder, offset: FixedOffset) -> Aggregator {
    Aggregator::new(order).with_offset(offset)
}
