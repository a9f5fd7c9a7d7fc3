//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use mizan_core::{
    read_json, Aggregator, CategoryTotal, ComplianceStatus, ConfigSource, HistoryOrder,
    MizanConfig, RuleStage,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use crate::commands::{self, truncate};

const RAW_CSV: &str = "id,timestamp,merchant_name,merchant_code,amount
a1,2026-03-17T19:00:00Z,Halal Grill House,5812,250.00
a2,2026-03-16T10:00:00Z,Fresh Market,5411,160.00
a3,2026-03-10T10:00:00Z,Fresh Market,5411,100.00
a4,2026-03-15T23:00:00Z,Corner Liquor,5921,40.00
a5,2026-02-12T20:00:00Z,Halal Grill House,5812,200.00
";

const NOW: &str = "2026-03-18T12:00:00Z";

fn config() -> MizanConfig {
    MizanConfig::embedded().unwrap()
}

fn utc_aggregator() -> Aggregator {
    commands::aggregator(HistoryOrder::Unsorted, commands::parse_utc_offset(0).unwrap())
}

fn write_csv(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("raw.csv");
    std::fs::write(&path, RAW_CSV).unwrap();
    path
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Fresh Market", 25), "Fresh Market");
    assert_eq!(truncate("A very long merchant name indeed", 10), "A very ...");
}

#[test]
fn test_parse_utc_offset() {
    let offset = commands::parse_utc_offset(180).unwrap();
    assert_eq!(offset.local_minus_utc(), 3 * 3600);
    let offset = commands::parse_utc_offset(-300).unwrap();
    assert_eq!(offset.local_minus_utc(), -5 * 3600);
    assert!(commands::parse_utc_offset(24 * 60).is_err());
}

#[test]
fn test_resolve_now() {
    assert_eq!(
        commands::resolve_now(Some("2026-03-18T15:00:00+03:00")).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 18, 12, 0, 0).unwrap()
    );
    assert!(commands::resolve_now(Some("next tuesday")).is_err());
    assert!(commands::resolve_now(None).is_ok());
}

#[test]
fn test_load_config_missing_rules_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(commands::load_config(Some(missing.as_path())).is_err());
}

// ========== Classify Command Tests ==========

#[test]
fn test_classify_merchant() {
    let config = config();

    let result = commands::classify_merchant(&config, "5411", "Fresh Market");
    assert_eq!(result.status, ComplianceStatus::Compliant);
    assert_eq!(result.category, "Groceries");
    assert_eq!(result.stage, Some(RuleStage::CompliantCode));
    assert_eq!(result.matched.as_deref(), Some("5411"));

    let result = commands::classify_merchant(&config, "5411", "Lucky Casino Grocery");
    assert_eq!(result.status, ComplianceStatus::NonCompliant);
    assert_eq!(result.stage, Some(RuleStage::NonCompliantKeyword));
    assert_eq!(result.matched.as_deref(), Some("casino"));

    let result = commands::classify_merchant(&config, "9999", "Unknown Shop");
    assert_eq!(result.status, ComplianceStatus::Unclassified);
    assert_eq!(result.category, "Other");
    assert!(result.stage.is_none());

    assert!(commands::cmd_classify(&config, "5411", "Fresh Market").is_ok());
}

#[test]
fn test_describe_rules_from_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.toml");
    std::fs::write(
        &path,
        r#"
[compliance]
compliant_keywords = ["halal", "zakat"]
non_compliant_keywords = ["casino"]
compliant_codes = ["5411", "5541", "5912"]
non_compliant_codes = ["5921"]

[categories]
default = "Misc"

[categories.codes]
"5411" = "Groceries"

[thresholds]
max_alerts = 2
"#,
    )
    .unwrap();

    let config = commands::load_config(Some(path.as_path())).unwrap();
    assert_eq!(config.source, ConfigSource::File(path.clone()));

    let lines = commands::describe_rules(&config);
    assert_eq!(lines[0], format!("Source: {}", path.display()));
    assert_eq!(lines[1], "Compliant:     2 keywords, 3 codes");
    assert_eq!(lines[2], "Non-compliant: 1 keywords, 1 codes");
    assert_eq!(lines[3], "Categories:    1 codes (default \"Misc\")");
    assert!(lines[5].ends_with("max 2"), "{}", lines[5]);

    assert!(commands::cmd_rules(&config).is_ok());
}

#[test]
fn test_describe_embedded_rules() {
    let lines = commands::describe_rules(&config());
    assert_eq!(lines[0], "Source: embedded defaults");
    assert!(lines[4].starts_with("Precedence: compliant keyword"));
}

// ========== Import Command Tests ==========

#[test]
fn test_cmd_import_writes_json() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);
    let output = dir.path().join("history.json");

    commands::cmd_import(&config(), &csv, Some(output.as_path())).unwrap();

    let history = read_json(std::fs::File::open(&output).unwrap()).unwrap();
    assert_eq!(history.len(), 5);
    assert_eq!(history[0].status, ComplianceStatus::Compliant);
    assert_eq!(history[3].status, ComplianceStatus::NonCompliant);
}

#[test]
fn test_cmd_import_rejects_negative_amount() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("bad.csv");
    std::fs::write(
        &csv,
        "id,timestamp,merchant_name,merchant_code,amount\nr1,2026-03-17T19:00:00Z,Refund,5411,-9.99\n",
    )
    .unwrap();

    let err = commands::cmd_import(&config(), &csv, None).unwrap_err();
    assert!(format!("{:#}", err).contains("negative"));
}

#[test]
fn test_cmd_import_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.csv");
    assert!(commands::cmd_import(&config(), &missing, None).is_err());
}

// ========== Report Command Tests ==========

#[test]
fn test_summarize_calendar_week() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);

    let week =
        commands::summarize(&config(), utc_aggregator(), &csv, "this-week", Some(NOW)).unwrap();
    assert_eq!(week.total(), dec!(410));
    assert_eq!(week.categories.get("Dining"), dec!(250));
    assert_eq!(week.compliance_ratio(), 100);
}

#[test]
fn test_summarize_offset_moves_boundary() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);
    // Sunday 23:00 UTC is Monday in UTC+2
    let plus_two = commands::aggregator(
        HistoryOrder::Unsorted,
        commands::parse_utc_offset(120).unwrap(),
    );

    let week = commands::summarize(&config(), plus_two, &csv, "this-week", Some(NOW)).unwrap();
    assert_eq!(week.categories.get("Alcohol"), dec!(40));
    assert_eq!(week.compliance_ratio(), 66);
}

#[test]
fn test_summarize_rolling_window() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);

    let days =
        commands::summarize(&config(), utc_aggregator(), &csv, "last-7-days", Some(NOW)).unwrap();
    // a3 on 2026-03-10 is outside the last 7 days
    assert_eq!(days.total(), dec!(450));
}

#[test]
fn test_summarize_unknown_window() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);
    assert!(commands::summarize(&config(), utc_aggregator(), &csv, "fortnight", Some(NOW)).is_err());
}

#[test]
fn test_cmd_summary_and_insights() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);
    let utc = utc_aggregator();

    assert!(commands::cmd_summary(&config(), utc, &csv, "this-month", Some(NOW)).is_ok());
    assert!(commands::cmd_insights(&config(), utc, &csv, Some(NOW), false).is_ok());
    assert!(commands::cmd_insights(&config(), utc, &csv, Some(NOW), true).is_ok());
}

#[test]
fn test_build_insights_from_json_history() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);
    let json = dir.path().join("history.json");
    commands::cmd_import(&config(), &csv, Some(json.as_path())).unwrap();
    let utc = utc_aggregator();

    let from_csv = commands::build_insights(&config(), utc, &csv, Some(NOW)).unwrap();
    let from_json = commands::build_insights(&config(), utc, &json, Some(NOW)).unwrap();
    assert_eq!(from_csv, from_json);

    let anomaly = from_json.anomaly.unwrap();
    assert_eq!(anomaly.category, "Dining");
}

#[test]
fn test_summarize_declared_order() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&dir);
    let utc = commands::parse_utc_offset(0).unwrap();
    let names = |order: HistoryOrder| {
        let agg = commands::aggregator(order, utc);
        let month = commands::summarize(&config(), agg, &csv, "this-month", Some(NOW)).unwrap();
        assert_eq!(month.total(), dec!(550));
        month
            .categories
            .iter()
            .map(|c| c.category.clone())
            .collect::<Vec<_>>()
    };

    // Categories keep first-appearance order of the walk the declared order implies
    assert_eq!(names(HistoryOrder::Unsorted), ["Dining", "Groceries", "Alcohol"]);
    assert_eq!(names(HistoryOrder::OldestFirst), ["Alcohol", "Groceries", "Dining"]);
}

#[test]
fn test_share_percent() {
    let entry = |amount: Decimal| CategoryTotal {
        category: "Dining".to_string(),
        amount,
    };
    assert_eq!(commands::share_percent(&entry(dec!(25)), dec!(100)), dec!(25));
    assert_eq!(commands::share_percent(&entry(dec!(25)), Decimal::ZERO), Decimal::ZERO);
    // Sub-cent amounts divide exactly; an impossible quotient saturates
    let tiny = Decimal::new(1, 28);
    assert_eq!(commands::share_percent(&entry(tiny), tiny), dec!(100));
    assert_eq!(commands::share_percent(&entry(dec!(1000)), tiny), Decimal::MAX);
}
