//! Behavioral signal extraction
//!
//! Each domain extractor computes a windowed metrics snapshot over a user's
//! accounts, transactions, and liabilities:
//! - `subscriptions` - recurring merchant detection and recurring spend
//! - `savings` - depository inflow, growth, and emergency fund coverage
//! - `credit` - per-card utilization tiers and payment behavior flags
//! - `income` - payroll deposit cadence and cash-flow buffer
//!
//! Metrics are computed for a short (30-day) and a long (180-day) trailing
//! window. A window with no relevant activity yields `None` - "no evidence",
//! never "false". Snapshots are immutable once returned.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::db::Database;
use crate::error::Result;
use crate::models::{Account, Liability, Transaction};

pub mod credit;
pub mod income;
pub mod savings;
pub mod subscriptions;

pub use credit::{CardUtilization, CreditMetrics, UtilizationLevel};
pub use income::IncomeMetrics;
pub use savings::SavingsMetrics;
pub use subscriptions::{RecurringMerchant, SubscriptionMetrics};

/// Trailing lookback window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    ShortTerm,
    LongTerm,
}

impl Window {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short_term",
            Self::LongTerm => "long_term",
        }
    }

    pub fn days(&self, config: &EngineConfig) -> i64 {
        match self {
            Self::ShortTerm => config.windows.short_term_days,
            Self::LongTerm => config.windows.long_term_days,
        }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-window metric pair for one domain.
///
/// `None` means the window held no relevant evidence. The persona layer
/// never treats an absent window as a failed predicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Windowed<T> {
    pub short_term: Option<T>,
    pub long_term: Option<T>,
}

impl<T> Windowed<T> {
    pub fn absent() -> Self {
        Self {
            short_term: None,
            long_term: None,
        }
    }

    pub fn get(&self, window: Window) -> Option<&T> {
        match window {
            Window::ShortTerm => self.short_term.as_ref(),
            Window::LongTerm => self.long_term.as_ref(),
        }
    }

    /// Either-window policy: the predicate matches when ANY present window
    /// satisfies it. This is the deliberate, named match semantics used by
    /// the persona predicates; absent windows contribute nothing.
    pub fn either_window<F>(&self, pred: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        self.window_satisfying(pred).is_some()
    }

    /// Which window satisfies the predicate, short term preferred.
    ///
    /// Rationale builders use this to cite figures from the same window
    /// that triggered the match.
    pub fn window_satisfying<F>(&self, pred: F) -> Option<(Window, &T)>
    where
        F: Fn(&T) -> bool,
    {
        if let Some(m) = self.short_term.as_ref() {
            if pred(m) {
                return Some((Window::ShortTerm, m));
            }
        }
        if let Some(m) = self.long_term.as_ref() {
            if pred(m) {
                return Some((Window::LongTerm, m));
            }
        }
        None
    }

    /// Most recent evidence available, short term preferred
    pub fn preferred(&self) -> Option<&T> {
        self.short_term.as_ref().or(self.long_term.as_ref())
    }

    pub fn any_present(&self) -> bool {
        self.short_term.is_some() || self.long_term.is_some()
    }
}

/// All extracted signals for one user at one point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralSignals {
    pub as_of: NaiveDate,
    pub subscriptions: Windowed<SubscriptionMetrics>,
    pub savings: Windowed<SavingsMetrics>,
    pub credit: Windowed<CreditMetrics>,
    pub income: Windowed<IncomeMetrics>,
}

impl BehavioralSignals {
    /// Number of domains with evidence in at least one window.
    /// The evaluation report counts these as "detected behaviors".
    pub fn detected_domain_count(&self) -> usize {
        [
            self.subscriptions.any_present(),
            self.savings.any_present(),
            self.credit.any_present(),
            self.income.any_present(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// Extractor facade over storage
///
/// Loads a user's raw data once per call and delegates to the pure
/// per-domain window computations. Storage errors propagate unchanged.
pub struct SignalExtractor<'a> {
    db: &'a Database,
    config: &'a EngineConfig,
}

/// Raw inputs for one user, loaded once
struct UserData {
    accounts: Vec<Account>,
    liabilities: Vec<Liability>,
    short_term: Vec<Transaction>,
    long_term: Vec<Transaction>,
}

impl<'a> SignalExtractor<'a> {
    pub fn new(db: &'a Database, config: &'a EngineConfig) -> Self {
        Self { db, config }
    }

    fn load(&self, user_id: &str, as_of: NaiveDate) -> Result<UserData> {
        let accounts = self.db.list_accounts(user_id)?;
        let liabilities = self.db.list_user_liabilities(user_id)?;
        let long_start = as_of - Duration::days(self.config.windows.long_term_days);
        let short_start = as_of - Duration::days(self.config.windows.short_term_days);
        let long_term = self.db.list_user_transactions(user_id, long_start, as_of)?;
        let short_term = long_term
            .iter()
            .filter(|tx| tx.date >= short_start)
            .cloned()
            .collect();
        Ok(UserData {
            accounts,
            liabilities,
            short_term,
            long_term,
        })
    }

    /// Run all four domain extractors
    pub fn extract_all(&self, user_id: &str, as_of: NaiveDate) -> Result<BehavioralSignals> {
        let data = self.load(user_id, as_of)?;

        let signals = BehavioralSignals {
            as_of,
            subscriptions: self.subscriptions_from(&data),
            savings: self.savings_from(&data),
            credit: self.credit_from(&data),
            income: self.income_from(&data),
        };

        tracing::debug!(
            user_id,
            domains = signals.detected_domain_count(),
            "Signal extraction complete"
        );

        Ok(signals)
    }

    /// Windowed subscription metrics for one user
    pub fn analyze_subscriptions_for_user(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<Windowed<SubscriptionMetrics>> {
        Ok(self.subscriptions_from(&self.load(user_id, as_of)?))
    }

    /// Windowed savings metrics for one user
    pub fn analyze_savings_for_user(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<Windowed<SavingsMetrics>> {
        Ok(self.savings_from(&self.load(user_id, as_of)?))
    }

    /// Windowed credit metrics for one user
    pub fn analyze_credit_for_user(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<Windowed<CreditMetrics>> {
        Ok(self.credit_from(&self.load(user_id, as_of)?))
    }

    /// Windowed income metrics for one user
    pub fn analyze_income_for_user(
        &self,
        user_id: &str,
        as_of: NaiveDate,
    ) -> Result<Windowed<IncomeMetrics>> {
        Ok(self.income_from(&self.load(user_id, as_of)?))
    }

    fn subscriptions_from(&self, data: &UserData) -> Windowed<SubscriptionMetrics> {
        Windowed {
            short_term: subscriptions::analyze_window(
                &data.short_term,
                &self.config.subscriptions,
            ),
            long_term: subscriptions::analyze_window(&data.long_term, &self.config.subscriptions),
        }
    }

    fn savings_from(&self, data: &UserData) -> Windowed<SavingsMetrics> {
        Windowed {
            short_term: savings::analyze_window(
                &data.accounts,
                &data.short_term,
                self.config.windows.short_term_days,
            ),
            long_term: savings::analyze_window(
                &data.accounts,
                &data.long_term,
                self.config.windows.long_term_days,
            ),
        }
    }

    fn credit_from(&self, data: &UserData) -> Windowed<CreditMetrics> {
        Windowed {
            short_term: credit::analyze_window(
                &data.accounts,
                &data.liabilities,
                &data.short_term,
                &self.config.credit,
            ),
            long_term: credit::analyze_window(
                &data.accounts,
                &data.liabilities,
                &data.long_term,
                &self.config.credit,
            ),
        }
    }

    fn income_from(&self, data: &UserData) -> Windowed<IncomeMetrics> {
        Windowed {
            short_term: income::analyze_window(
                &data.accounts,
                &data.short_term,
                &self.config.income,
                self.config.windows.short_term_days,
            ),
            long_term: income::analyze_window(
                &data.accounts,
                &data.long_term,
                &self.config.income,
                self.config.windows.long_term_days,
            ),
        }
    }
}

/// Simple merchant name normalization
pub(crate) fn normalize_merchant(description: &str) -> String {
    let desc = description.to_uppercase();

    let cleaned = desc
        .replace("*", " ")
        .replace("#", " ")
        .split_whitespace()
        .take(3) // Take first 3 words
        .collect::<Vec<_>>()
        .join(" ");

    cleaned
}

/// Calculate median of a slice
pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Average monthly expenses across all of a user's in-window transactions
pub(crate) fn average_monthly_expenses(transactions: &[Transaction], window_days: i64) -> f64 {
    let total: f64 = transactions
        .iter()
        .filter(|tx| tx.is_expense())
        .map(|tx| tx.amount.abs())
        .sum();
    let months = window_days as f64 / 30.0;
    if months <= 0.0 {
        return 0.0;
    }
    total / months
}
