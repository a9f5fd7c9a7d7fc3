//! Windowed aggregation of classified transactions
//!
//! Two windowing policies exist side by side and are selected with a single
//! [`WindowPolicy`] parameter:
//!
//! - **Calendar** windows follow ISO weeks (Monday start) or calendar months
//!   in the aggregator's UTC offset. `periods_back = 1` is the prior week or
//!   month. Insights use these.
//! - **Rolling** windows cover the last 24 hours, 7 days or 30 days before the
//!   reference instant, ignoring calendar boundaries. User-facing period
//!   totals use these.
//!
//! Both ends of a window are inclusive. The reference instant is always
//! supplied by the caller.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{ComplianceStatus, HistoryOrder, Transaction};

/// Calendar unit for calendar windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarUnit {
    /// ISO week, Monday through Sunday
    Week,
    Month,
}

/// Elapsed span for rolling windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollingSpan {
    /// 24 hours
    Day,
    /// 7 days
    Week,
    /// 30 days
    Month,
}

impl RollingSpan {
    pub fn duration(&self) -> Duration {
        match self {
            RollingSpan::Day => Duration::hours(24),
            RollingSpan::Week => Duration::days(7),
            RollingSpan::Month => Duration::days(30),
        }
    }

    pub fn all() -> &'static [RollingSpan] {
        &[RollingSpan::Day, RollingSpan::Week, RollingSpan::Month]
    }
}

/// How a window is cut out of the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum WindowPolicy {
    Calendar { unit: CalendarUnit, periods_back: u32 },
    Rolling { span: RollingSpan },
}

impl WindowPolicy {
    pub fn this_week() -> Self {
        WindowPolicy::Calendar {
            unit: CalendarUnit::Week,
            periods_back: 0,
        }
    }

    pub fn last_week() -> Self {
        WindowPolicy::Calendar {
            unit: CalendarUnit::Week,
            periods_back: 1,
        }
    }

    pub fn this_month() -> Self {
        WindowPolicy::Calendar {
            unit: CalendarUnit::Month,
            periods_back: 0,
        }
    }

    pub fn last_month() -> Self {
        WindowPolicy::Calendar {
            unit: CalendarUnit::Month,
            periods_back: 1,
        }
    }

    pub fn rolling(span: RollingSpan) -> Self {
        WindowPolicy::Rolling { span }
    }

    /// Short name used on the command line and in reports
    pub fn name(&self) -> String {
        match self {
            WindowPolicy::Calendar { unit, periods_back } => match (unit, periods_back) {
                (CalendarUnit::Week, 0) => "this-week".to_string(),
                (CalendarUnit::Week, 1) => "last-week".to_string(),
                (CalendarUnit::Month, 0) => "this-month".to_string(),
                (CalendarUnit::Month, 1) => "last-month".to_string(),
                (CalendarUnit::Week, n) => format!("{}-weeks-ago", n),
                (CalendarUnit::Month, n) => format!("{}-months-ago", n),
            },
            WindowPolicy::Rolling { span } => match span {
                RollingSpan::Day => "last-24h".to_string(),
                RollingSpan::Week => "last-7-days".to_string(),
                RollingSpan::Month => "last-30-days".to_string(),
            },
        }
    }
}

impl std::str::FromStr for WindowPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "this-week" => Ok(WindowPolicy::this_week()),
            "last-week" => Ok(WindowPolicy::last_week()),
            "this-month" => Ok(WindowPolicy::this_month()),
            "last-month" => Ok(WindowPolicy::last_month()),
            "last-24h" | "last-day" => Ok(WindowPolicy::rolling(RollingSpan::Day)),
            "last-7-days" => Ok(WindowPolicy::rolling(RollingSpan::Week)),
            "last-30-days" => Ok(WindowPolicy::rolling(RollingSpan::Month)),
            _ => Err(format!(
                "Unknown window: {}. Available: this-week, last-week, this-month, last-month, last-24h, last-7-days, last-30-days",
                s
            )),
        }
    }
}

impl std::fmt::Display for WindowPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Spend summed for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

/// Per-category sums in first-appearance order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTotals {
    entries: Vec<CategoryTotal>,
}

impl CategoryTotals {
    fn add(&mut self, category: &str, amount: Decimal) {
        match self.entries.iter_mut().find(|e| e.category == category) {
            Some(entry) => entry.amount = entry.amount.saturating_add(amount),
            None => self.entries.push(CategoryTotal {
                category: category.to_string(),
                amount,
            }),
        }
    }

    /// Sum for a category (zero when absent)
    pub fn get(&self, category: &str) -> Decimal {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.amount)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CategoryTotal> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.entries
            .iter()
            .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.amount))
    }

    /// Categories by amount, largest first (ties keep first-appearance order)
    pub fn ranked(&self) -> Vec<&CategoryTotal> {
        let mut ranked: Vec<&CategoryTotal> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.amount.cmp(&a.amount));
        ranked
    }
}

impl<'a> IntoIterator for &'a CategoryTotals {
    type Item = &'a CategoryTotal;
    type IntoIter = std::slice::Iter<'a, CategoryTotal>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Transaction counts per compliance status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub compliant: usize,
    pub unclassified: usize,
    pub non_compliant: usize,
}

impl StatusCounts {
    pub fn get(&self, status: ComplianceStatus) -> usize {
        match status {
            ComplianceStatus::Compliant => self.compliant,
            ComplianceStatus::Unclassified => self.unclassified,
            ComplianceStatus::NonCompliant => self.non_compliant,
        }
    }

    fn increment(&mut self, status: ComplianceStatus) {
        match status {
            ComplianceStatus::Compliant => self.compliant += 1,
            ComplianceStatus::Unclassified => self.unclassified += 1,
            ComplianceStatus::NonCompliant => self.non_compliant += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.compliant + self.unclassified + self.non_compliant
    }

    /// Percentage of compliant transactions, truncated toward zero.
    /// An empty set counts as fully compliant (100).
    pub fn compliance_ratio(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 100;
        }
        (self.compliant * 100 / total) as u32
    }
}

/// Sum amounts per category, in the order categories first appear
pub fn sum_by_category<'t, I>(transactions: I) -> CategoryTotals
where
    I: IntoIterator<Item = &'t Transaction>,
{
    let mut totals = CategoryTotals::default();
    for tx in transactions {
        totals.add(&tx.category, tx.amount);
    }
    totals
}

/// Count transactions per compliance status
pub fn count_by_status<'t, I>(transactions: I) -> StatusCounts
where
    I: IntoIterator<Item = &'t Transaction>,
{
    let mut counts = StatusCounts::default();
    for tx in transactions {
        counts.increment(tx.status);
    }
    counts
}

/// Percentage of compliant transactions (100 for an empty list)
pub fn compliance_ratio<'t, I>(transactions: I) -> u32
where
    I: IntoIterator<Item = &'t Transaction>,
{
    count_by_status(transactions).compliance_ratio()
}

/// Aggregated view of one window of the history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingWindow {
    pub policy: WindowPolicy,
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Inclusive end
    pub end: DateTime<Utc>,
    pub categories: CategoryTotals,
    pub statuses: StatusCounts,
}

impl SpendingWindow {
    pub fn total(&self) -> Decimal {
        self.categories.total()
    }

    pub fn transaction_count(&self) -> usize {
        self.statuses.total()
    }

    pub fn compliance_ratio(&self) -> u32 {
        self.statuses.compliance_ratio()
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Cuts windows out of a transaction history
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    order: HistoryOrder,
    offset: FixedOffset,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(HistoryOrder::default())
    }
}

impl Aggregator {
    /// Create an aggregator for histories in the given order, using UTC
    /// calendar boundaries
    pub fn new(order: HistoryOrder) -> Self {
        Self {
            order,
            offset: Utc.fix(),
        }
    }

    /// Use a different UTC offset for calendar week/month boundaries
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn order(&self) -> HistoryOrder {
        self.order
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The history walked newest-first, whatever order it was supplied in
    pub fn newest_first<'t>(&self, history: &'t [Transaction]) -> Vec<&'t Transaction> {
        match self.order {
            HistoryOrder::NewestFirst => history.iter().collect(),
            HistoryOrder::OldestFirst => history.iter().rev().collect(),
            HistoryOrder::Unsorted => {
                let mut sorted: Vec<&Transaction> = history.iter().collect();
                sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                sorted
            }
        }
    }

    /// Inclusive bounds of a window relative to `now`
    pub fn bounds(&self, now: DateTime<Utc>, policy: WindowPolicy) -> (DateTime<Utc>, DateTime<Utc>) {
        match policy {
            WindowPolicy::Rolling { span } => (now - span.duration(), now),
            WindowPolicy::Calendar { unit, periods_back } => {
                let today = now.with_timezone(&self.offset).date_naive();
                let (start, next_start) = match unit {
                    CalendarUnit::Week => {
                        let monday = today
                            - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                        let start = monday - Duration::weeks(i64::from(periods_back));
                        (start, start + Duration::weeks(1))
                    }
                    CalendarUnit::Month => {
                        let start = shift_month(today, -(periods_back as i32));
                        (start, shift_month(start, 1))
                    }
                };
                (
                    self.local_midnight(start),
                    self.local_midnight(next_start) - Duration::nanoseconds(1),
                )
            }
        }
    }

    fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(NaiveTime::MIN);
        (local - Duration::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }

    /// Aggregate the transactions that fall inside a window
    pub fn window(
        &self,
        history: &[Transaction],
        now: DateTime<Utc>,
        policy: WindowPolicy,
    ) -> SpendingWindow {
        let (start, end) = self.bounds(now, policy);
        let mut window = SpendingWindow {
            policy,
            start,
            end,
            categories: CategoryTotals::default(),
            statuses: StatusCounts::default(),
        };

        let members: Vec<&Transaction> = self
            .newest_first(history)
            .into_iter()
            .filter(|tx| window.contains(tx.timestamp))
            .collect();
        window.categories = sum_by_category(members.iter().copied());
        window.statuses = count_by_status(members.iter().copied());

        debug!(
            window = %policy,
            order = self.order.as_str(),
            transactions = window.transaction_count(),
            categories = window.categories.len(),
            "Aggregated window"
        );

        window
    }

    /// Last-24h, last-7-days and last-30-days windows
    pub fn rolling_totals(&self, history: &[Transaction], now: DateTime<Utc>) -> Vec<SpendingWindow> {
        RollingSpan::all()
            .iter()
            .map(|span| self.window(history, now, WindowPolicy::rolling(*span)))
            .collect()
    }
}

/// First day of the month `delta` months away from `date`'s month
fn shift_month(date: NaiveDate, delta: i32) -> NaiveDate {
    let months = date.year() * 12 + date.month0() as i32 + delta;
    let (year, month0) = (months.div_euclid(12), months.rem_euclid(12));
    NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1).unwrap_or(date)
}
