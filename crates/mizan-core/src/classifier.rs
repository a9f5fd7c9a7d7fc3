//! Merchant classifier
//!
//! Maps a merchant category code and merchant name to a compliance status and
//! a category label. Rules come from an immutable [`RuleSet`] that is built
//! once (see [`crate::config`]) and shared by reference.
//!
//! Classification runs an ordered cascade of stages; the first stage that
//! matches decides the status:
//!
//! 1. compliant keyword in the merchant name
//! 2. non-compliant keyword in the merchant name
//! 3. compliant merchant code
//! 4. non-compliant merchant code
//!
//! Anything left over is [`ComplianceStatus::Unclassified`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{ComplianceStatus, RawTransaction, Transaction};

/// Category label used for merchant codes with no table entry
pub const DEFAULT_CATEGORY: &str = "Other";

/// Immutable classification rule tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    compliant_codes: BTreeSet<String>,
    non_compliant_codes: BTreeSet<String>,
    compliant_keywords: Vec<String>,
    non_compliant_keywords: Vec<String>,
    categories: BTreeMap<String, String>,
    default_category: String,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            compliant_codes: BTreeSet::new(),
            non_compliant_codes: BTreeSet::new(),
            compliant_keywords: Vec::new(),
            non_compliant_keywords: Vec::new(),
            categories: BTreeMap::new(),
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl RuleSet {
    /// An empty rule set: every transaction is Unclassified / "Other"
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_compliant_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.compliant_codes
            .extend(codes.into_iter().map(|c| normalize_code(c.as_ref())));
        self
    }

    pub fn with_non_compliant_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.non_compliant_codes
            .extend(codes.into_iter().map(|c| normalize_code(c.as_ref())));
        self
    }

    /// Append compliant keywords, keeping their order
    pub fn with_compliant_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        push_keywords(&mut self.compliant_keywords, keywords);
        self
    }

    /// Append non-compliant keywords, keeping their order
    pub fn with_non_compliant_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        push_keywords(&mut self.non_compliant_keywords, keywords);
        self
    }

    /// Map a merchant code to a category label (many codes may share a label)
    pub fn with_category(mut self, code: &str, label: impl Into<String>) -> Self {
        self.categories.insert(normalize_code(code), label.into());
        self
    }

    pub fn with_default_category(mut self, label: impl Into<String>) -> Self {
        self.default_category = label.into();
        self
    }

    pub fn compliant_codes(&self) -> &BTreeSet<String> {
        &self.compliant_codes
    }

    pub fn non_compliant_codes(&self) -> &BTreeSet<String> {
        &self.non_compliant_codes
    }

    pub fn compliant_keywords(&self) -> &[String] {
        &self.compliant_keywords
    }

    pub fn non_compliant_keywords(&self) -> &[String] {
        &self.non_compliant_keywords
    }

    pub fn categories(&self) -> &BTreeMap<String, String> {
        &self.categories
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_string()
}

fn push_keywords<I, S>(target: &mut Vec<String>, keywords: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for keyword in keywords {
        let keyword = keyword.as_ref().trim().to_lowercase();
        // An empty keyword would match every merchant name
        if !keyword.is_empty() && !target.contains(&keyword) {
            target.push(keyword);
        }
    }
}

/// A stage of the classification cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStage {
    CompliantKeyword,
    NonCompliantKeyword,
    CompliantCode,
    NonCompliantCode,
}

impl RuleStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStage::CompliantKeyword => "compliant_keyword",
            RuleStage::NonCompliantKeyword => "non_compliant_keyword",
            RuleStage::CompliantCode => "compliant_code",
            RuleStage::NonCompliantCode => "non_compliant_code",
        }
    }

    /// Returns the keyword or code that matched, if any.
    /// `name` must already be trimmed and lower-cased.
    fn matches(&self, rules: &RuleSet, code: &str, name: &str) -> Option<String> {
        match self {
            RuleStage::CompliantKeyword => find_keyword(&rules.compliant_keywords, name),
            RuleStage::NonCompliantKeyword => find_keyword(&rules.non_compliant_keywords, name),
            RuleStage::CompliantCode => rules
                .compliant_codes
                .contains(code)
                .then(|| code.to_string()),
            RuleStage::NonCompliantCode => rules
                .non_compliant_codes
                .contains(code)
                .then(|| code.to_string()),
        }
    }
}

impl std::fmt::Display for RuleStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn find_keyword(keywords: &[String], name: &str) -> Option<String> {
    keywords.iter().find(|k| name.contains(k.as_str())).cloned()
}

/// Cascade evaluated top to bottom; the first matching stage wins
const CASCADE: [(RuleStage, ComplianceStatus); 4] = [
    (RuleStage::CompliantKeyword, ComplianceStatus::Compliant),
    (RuleStage::NonCompliantKeyword, ComplianceStatus::NonCompliant),
    (RuleStage::CompliantCode, ComplianceStatus::Compliant),
    (RuleStage::NonCompliantCode, ComplianceStatus::NonCompliant),
];

/// Outcome of classifying one merchant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub status: ComplianceStatus,
    pub category: String,
    /// Stage that decided the status (None = fell through to Unclassified)
    pub stage: Option<RuleStage>,
    /// Keyword or code that matched
    pub matched: Option<String>,
}

/// Classifies merchants against a borrowed rule set
#[derive(Debug, Clone, Copy)]
pub struct MerchantClassifier<'a> {
    rules: &'a RuleSet,
}

impl<'a> MerchantClassifier<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// Classify a merchant by code and name
    pub fn classify(&self, code: &str, name: &str) -> Classification {
        let code = code.trim();
        let name = name.trim().to_lowercase();
        let category = self.category_of(code).to_string();

        for (stage, status) in CASCADE {
            if let Some(matched) = stage.matches(self.rules, code, &name) {
                return Classification {
                    status,
                    category,
                    stage: Some(stage),
                    matched: Some(matched),
                };
            }
        }

        Classification {
            status: ComplianceStatus::Unclassified,
            category,
            stage: None,
            matched: None,
        }
    }

    /// Category label for a merchant code, "Other" (or the configured default)
    /// when the code is not in the table
    pub fn category_of(&self, code: &str) -> &'a str {
        let rules = self.rules;
        rules
            .categories
            .get(code.trim())
            .map(String::as_str)
            .unwrap_or(rules.default_category.as_str())
    }

    /// Classify a raw transaction into its immutable, classified form
    pub fn classify_transaction(&self, raw: RawTransaction) -> Transaction {
        let classification = self.classify(&raw.merchant_code, &raw.merchant_name);
        Transaction {
            id: raw.id,
            merchant_name: raw.merchant_name,
            merchant_code: raw.merchant_code,
            amount: raw.amount,
            timestamp: raw.timestamp,
            status: classification.status,
            category: classification.category,
        }
    }
}
