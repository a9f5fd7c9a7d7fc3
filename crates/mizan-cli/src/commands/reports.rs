//! Report command implementations

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mizan_core::insights::{AlertSeverity, InsightEngine, InsightReport};
use mizan_core::{
    Aggregator, CategoryTotal, ComplianceStatus, MizanConfig, SpendingWindow, WindowPolicy,
};
use rust_decimal::Decimal;

use super::{open_history, resolve_now, truncate};

/// Aggregate one window of a history file
pub fn summarize(
    config: &MizanConfig,
    aggregator: Aggregator,
    file: &Path,
    window: &str,
    now: Option<&str>,
) -> Result<SpendingWindow> {
    let policy = WindowPolicy::from_str(window).map_err(anyhow::Error::msg)?;
    let now = resolve_now(now)?;
    let history = open_history(config, file)?;
    tracing::debug!(order = aggregator.order().as_str(), window = %policy, "Summarizing history");
    Ok(aggregator.window(&history, now, policy))
}

pub fn cmd_summary(
    config: &MizanConfig,
    aggregator: Aggregator,
    file: &Path,
    window: &str,
    now: Option<&str>,
) -> Result<()> {
    let summary = summarize(config, aggregator, file, window, now)?;
    let offset = aggregator.offset();
    let local = |ts: DateTime<Utc>| ts.with_timezone(&offset).format("%Y-%m-%d %H:%M");

    println!();
    println!("📊 Spending Summary ({})", summary.policy);
    println!("   Period: {} to {}", local(summary.start), local(summary.end));
    println!("   ─────────────────────────────────────────────────────────────");

    if summary.categories.is_empty() {
        println!("   No spending found in this period.");
        return Ok(());
    }

    let total = summary.total();
    println!("   Total: ${:.2}", total);
    println!();
    println!("   {:25} │ {:>10} │ {:>6}", "Category", "Amount", "%");
    println!("   ──────────────────────────┼────────────┼────────");
    for entry in &summary.categories {
        let share = share_percent(entry, total);
        println!(
            "   {:25} │ {:>10.2} │ {:>5.1}%",
            truncate(&entry.category, 25),
            entry.amount,
            share
        );
    }

    println!();
    for status in ComplianceStatus::all() {
        println!("   {:14} {:>5}", status.label(), summary.statuses.get(*status));
    }
    println!("   Compliance: {}%", summary.compliance_ratio());

    Ok(())
}

/// Percentage of `total` spent in one category; zero when there is no total
pub fn share_percent(entry: &CategoryTotal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    entry
        .amount
        .checked_div(total)
        .map_or(Decimal::MAX, |ratio| ratio.saturating_mul(Decimal::ONE_HUNDRED))
}

/// Run the insight engine over a history file
pub fn build_insights(
    config: &MizanConfig,
    aggregator: Aggregator,
    file: &Path,
    now: Option<&str>,
) -> Result<InsightReport> {
    let now = resolve_now(now)?;
    let history = open_history(config, file)?;
    let engine = InsightEngine::with_config(aggregator, config.thresholds.clone());
    Ok(engine.analyze(&history, now))
}

fn severity_icon(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::Positive => "🟢",
        AlertSeverity::Caution => "🟡",
        AlertSeverity::Critical => "🔴",
    }
}

pub fn cmd_insights(
    config: &MizanConfig,
    aggregator: Aggregator,
    file: &Path,
    now: Option<&str>,
    json: bool,
) -> Result<()> {
    let report = build_insights(config, aggregator, file, now)?;

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", out);
        return Ok(());
    }

    println!();
    println!("🔔 Alerts");
    println!("   ─────────────────────────────────────────────────────────────");
    if report.alerts.is_empty() {
        println!("   Nothing to report this week.");
    }
    for alert in &report.alerts {
        println!("   {} {}", severity_icon(alert.severity), alert.message);
    }

    println!();
    println!("💡 Recommendations");
    println!("   ─────────────────────────────────────────────────────────────");
    for rec in &report.recommendations {
        println!("   • {} [{}]", rec.title, rec.category);
        println!("     {}", rec.description);
    }

    if let Some(anomaly) = &report.anomaly {
        println!();
        println!("⚠️  Anomaly");
        println!("   ─────────────────────────────────────────────────────────────");
        println!(
            "   {} ({}): ${:.2} this week vs ${:.2} weekly average",
            anomaly.category, anomaly.severity, anomaly.amount, anomaly.baseline_average
        );
    }

    Ok(())
}
