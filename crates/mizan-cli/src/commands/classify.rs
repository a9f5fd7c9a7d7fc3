//! Classification command implementations

use anyhow::Result;
use mizan_core::{Classification, ComplianceStatus, MerchantClassifier, MizanConfig};

fn status_icon(status: ComplianceStatus) -> &'static str {
    match status {
        ComplianceStatus::Compliant => "✅",
        ComplianceStatus::Unclassified => "❔",
        ComplianceStatus::NonCompliant => "⛔",
    }
}

/// Classify one merchant against the active rules
pub fn classify_merchant(config: &MizanConfig, code: &str, name: &str) -> Classification {
    MerchantClassifier::new(&config.rules).classify(code, name)
}

pub fn cmd_classify(config: &MizanConfig, code: &str, name: &str) -> Result<()> {
    let result = classify_merchant(config, code, name);

    println!();
    println!("{} {} ({})", status_icon(result.status), name, code);
    println!("   Status:   {}", result.status.label());
    println!("   Category: {}", result.category);
    match (result.stage, result.matched.as_deref()) {
        (Some(stage), Some(matched)) => println!("   Rule:     {} \"{}\"", stage, matched),
        _ => println!("   Rule:     no rule matched"),
    }

    Ok(())
}

/// Human-readable overview of the active rules and thresholds
pub fn describe_rules(config: &MizanConfig) -> Vec<String> {
    let rules = &config.rules;
    let t = &config.thresholds;

    vec![
        format!("Source: {}", config.source),
        format!(
            "Compliant:     {} keywords, {} codes",
            rules.compliant_keywords().len(),
            rules.compliant_codes().len()
        ),
        format!(
            "Non-compliant: {} keywords, {} codes",
            rules.non_compliant_keywords().len(),
            rules.non_compliant_codes().len()
        ),
        format!(
            "Categories:    {} codes (default \"{}\")",
            rules.categories().len(),
            rules.default_category()
        ),
        "Precedence: compliant keyword > non-compliant keyword > compliant code > non-compliant code"
            .to_string(),
        format!(
            "Alerts:   +{}% critical, +{}% caution, {}% decrease, max {}",
            t.alert_critical_increase_percent,
            t.alert_caution_increase_percent,
            t.alert_decrease_percent,
            t.max_alerts
        ),
        format!(
            "Anomaly:  {}x high, {}x moderate, above ${}",
            t.anomaly_high_ratio, t.anomaly_moderate_ratio, t.anomaly_min_amount
        ),
    ]
}

pub fn cmd_rules(config: &MizanConfig) -> Result<()> {
    println!();
    println!("📜 Classification Rules");
    println!("   ─────────────────────────────────────────────");
    for line in describe_rules(config) {
        println!("   {}", line);
    }

    Ok(())
}
