//! Transaction ingestion
//!
//! Raw exports arrive as CSV with the columns
//! `id,timestamp,merchant_name,merchant_code,amount`. Each row is classified
//! once, here, and the resulting transactions can be stored as JSON.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::classifier::MerchantClassifier;
use crate::error::{Error, Result};
use crate::models::{RawTransaction, Transaction};

/// One CSV row as written by the export
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    timestamp: String,
    merchant_name: String,
    #[serde(default)]
    merchant_code: String,
    amount: String,
}

/// Parse raw CSV rows without classifying them
pub fn parse_raw_csv<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut transactions = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: CsvRow = record.deserialize(Some(&headers))?;

        let timestamp = parse_timestamp(&row.timestamp)
            .map_err(|e| Error::InvalidData(format!("line {}: {}", line, e)))?;
        let amount = parse_amount(&row.amount)
            .map_err(|e| Error::InvalidData(format!("line {}: {}", line, e)))?;

        transactions.push(RawTransaction {
            id: row.id,
            timestamp,
            merchant_name: row.merchant_name,
            merchant_code: row.merchant_code,
            amount,
        });
    }

    Ok(transactions)
}

/// Parse CSV rows and classify each one
pub fn parse_csv<R: Read>(reader: R, classifier: &MerchantClassifier<'_>) -> Result<Vec<Transaction>> {
    let transactions: Vec<Transaction> = parse_raw_csv(reader)?
        .into_iter()
        .map(|raw| classifier.classify_transaction(raw))
        .collect();

    debug!(count = transactions.len(), "Parsed transaction CSV");
    Ok(transactions)
}

/// Read a classified history from JSON
pub fn read_json<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let transactions: Vec<Transaction> = serde_json::from_reader(reader)?;

    if let Some(tx) = transactions.iter().find(|tx| tx.amount.is_sign_negative()) {
        return Err(Error::InvalidData(format!(
            "transaction {}: negative amount {}",
            tx.id, tx.amount
        )));
    }

    Ok(transactions)
}

/// Write a classified history as pretty-printed JSON
pub fn write_json(path: &Path, transactions: &[Transaction]) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, transactions)?;
    debug!(count = transactions.len(), path = %path.display(), "Wrote history");
    Ok(())
}

/// Load a history file: `.csv` is ingested and classified, anything else is
/// read as classified JSON
pub fn load_history(path: &Path, classifier: &MerchantClassifier<'_>) -> Result<Vec<Transaction>> {
    let reader = BufReader::new(File::open(path)?);
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        parse_csv(reader, classifier)
    } else {
        read_json(reader)
    }
}

/// Parse a timestamp: RFC 3339, or a naive date/time taken as UTC
fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    let s = s.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    Err(format!("unable to parse timestamp: {}", s))
}

/// Parse a non-negative amount, allowing a currency symbol and thousands separators
fn parse_amount(s: &str) -> std::result::Result<Decimal, String> {
    let cleaned = s.trim().replace(['$', ',', ' '], "");

    let amount =
        Decimal::from_str(&cleaned).map_err(|_| format!("unable to parse amount: {}", s))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(format!("negative amount: {}", s));
    }

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RuleSet;
    use crate::models::ComplianceStatus;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn rules() -> RuleSet {
        RuleSet::empty()
            .with_compliant_codes(["5411"])
            .with_non_compliant_codes(["5921"])
            .with_non_compliant_keywords(["casino"])
            .with_category("5411", "Groceries")
            .with_category("5921", "Alcohol")
    }

    const SAMPLE: &str = "id,timestamp,merchant_name,merchant_code,amount
t1,2026-03-04T12:00:00Z,Fresh Market,5411,42.10
t2,2026-03-03 18:30:00,Corner Liquor,5921,\"$1,250.00\"
t3,2026-03-02,Lucky Casino Grocery,5411,15
";

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(
            parse_timestamp("2026-03-04T14:00:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap()
        );
        assert_eq!(
            parse_timestamp("2026-03-04").unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap()
        );
        assert!(parse_timestamp("04/03/2026 noon").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_amount("0.00").unwrap(), Decimal::ZERO);
        assert!(parse_amount("-12.00").is_err());
        assert!(parse_amount("twelve").is_err());
    }

    #[test]
    fn test_parse_csv_classifies_rows() {
        let rules = rules();
        let classifier = MerchantClassifier::new(&rules);
        let transactions = parse_csv(SAMPLE.as_bytes(), &classifier).unwrap();

        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[0].status, ComplianceStatus::Compliant);
        assert_eq!(transactions[0].category, "Groceries");
        assert_eq!(transactions[0].amount, dec!(42.10));

        assert_eq!(transactions[1].status, ComplianceStatus::NonCompliant);
        assert_eq!(transactions[1].amount, dec!(1250.00));
        assert_eq!(
            transactions[1].timestamp,
            Utc.with_ymd_and_hms(2026, 3, 3, 18, 30, 0).unwrap()
        );

        // Keyword beats the compliant code
        assert_eq!(transactions[2].status, ComplianceStatus::NonCompliant);
        assert_eq!(transactions[2].category, "Groceries");
    }

    #[test]
    fn test_negative_amount_names_line() {
        let csv = "id,timestamp,merchant_name,merchant_code,amount
t1,2026-03-04T12:00:00Z,Refund,5411,-5.00
";
        let rules = rules();
        let err = parse_csv(csv.as_bytes(), &MerchantClassifier::new(&rules)).unwrap_err();
        match err {
            Error::InvalidData(msg) => {
                assert!(msg.contains("line 2"), "{}", msg);
                assert!(msg.contains("negative"), "{}", msg);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let csv = "id,timestamp,merchant_name,merchant_code,amount
t1,yesterday,Shop,5411,5.00
";
        let rules = rules();
        let err = parse_csv(csv.as_bytes(), &MerchantClassifier::new(&rules)).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_json_history_round_trip_through_files() {
        let rules = rules();
        let classifier = MerchantClassifier::new(&rules);
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("raw.CSV");
        std::fs::write(&csv_path, SAMPLE).unwrap();
        let from_csv = load_history(&csv_path, &classifier).unwrap();

        let json_path = dir.path().join("history.json");
        write_json(&json_path, &from_csv).unwrap();
        let from_json = load_history(&json_path, &classifier).unwrap();

        assert_eq!(from_csv, from_json);
    }

    #[test]
    fn test_read_json_rejects_negative_amount() {
        let json = r#"[{"id":"x","merchant_name":"m","merchant_code":"0000","amount":"-1",
            "timestamp":"2026-03-04T12:00:00Z","status":"compliant","category":"Other"}]"#;
        assert!(matches!(
            read_json(json.as_bytes()),
            Err(Error::InvalidData(_))
        ));
    }
}
