//! Import command implementations

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use mizan_core::{
    count_by_status, import::write_json, parse_csv, ComplianceStatus, MerchantClassifier,
    MizanConfig, Transaction,
};

use super::truncate;

/// Classify a raw CSV export, optionally writing the result as JSON
pub fn cmd_import(config: &MizanConfig, file: &Path, output: Option<&Path>) -> Result<()> {
    let reader =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let classifier = MerchantClassifier::new(&config.rules);
    let transactions = parse_csv(reader, &classifier)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    tracing::info!(count = transactions.len(), "Classified transactions");

    print_import_summary(&transactions);

    if let Some(output) = output {
        write_json(output, &transactions)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!();
        println!("   Saved {} transactions to {}", transactions.len(), output.display());
    }

    Ok(())
}

fn print_import_summary(transactions: &[Transaction]) {
    println!();
    println!("📥 Imported {} transactions", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");

    if transactions.is_empty() {
        return;
    }

    let counts = count_by_status(transactions);
    for status in ComplianceStatus::all() {
        println!("   {:14} {:>5}", status.label(), counts.get(*status));
    }
    println!();
    println!(
        "   {:25} │ {:14} │ {:12} │ {:>10}",
        "Merchant", "Status", "Category", "Amount"
    );
    println!("   ──────────────────────────┼────────────────┼──────────────┼───────────");
    for tx in transactions {
        println!(
            "   {:25} │ {:14} │ {:12} │ {:>10.2}",
            truncate(&tx.merchant_name, 25),
            tx.status.label(),
            truncate(&tx.category, 12),
            tx.amount
        );
    }
}
