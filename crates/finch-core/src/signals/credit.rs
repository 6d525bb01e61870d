//! Credit signal extraction
//!
//! Per-card utilization tiers plus payment behavior flags. Utilization is
//! point-in-time (balance over limit), so metrics are present whenever the
//! user has credit cards; the behavior flags derive from window
//! transactions and liability detail.

use serde::{Deserialize, Serialize};

use crate::config::CreditConfig;
use crate::models::{Account, Liability, Transaction};

/// Utilization tier for a single card
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl UtilizationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }

    /// Tier for a utilization ratio
    pub fn from_ratio(ratio: f64, config: &CreditConfig) -> Self {
        if ratio >= config.very_high_utilization {
            Self::VeryHigh
        } else if ratio >= config.high_utilization {
            Self::High
        } else if ratio >= config.medium_utilization {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for UtilizationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Utilization snapshot for one card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardUtilization {
    pub account_id: String,
    /// Last four characters of the account id, for user-facing text
    pub last_four: String,
    pub balance: f64,
    pub limit: f64,
    pub utilization: f64,
    pub level: UtilizationLevel,
}

/// Windowed credit metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditMetrics {
    pub cards: Vec<CardUtilization>,
    pub has_interest_charges: bool,
    pub has_overdue: bool,
    pub has_minimum_payment_only: bool,
    /// Any card at or above the medium tier, or any overdue liability
    pub meets_threshold: bool,
}

impl CreditMetrics {
    /// The card with the highest utilization, for rationale text
    pub fn highest_card(&self) -> Option<&CardUtilization> {
        self.cards.iter().max_by(|a, b| {
            a.utilization
                .partial_cmp(&b.utilization)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    pub fn any_card_at_or_above(&self, level: UtilizationLevel) -> bool {
        self.cards.iter().any(|c| c.level >= level)
    }

    pub fn all_cards_below(&self, level: UtilizationLevel) -> bool {
        self.cards.iter().all(|c| c.level < level)
    }
}

/// Compute credit metrics for one window.
///
/// Returns `None` when the user has no credit-card accounts at all.
pub fn analyze_window(
    accounts: &[Account],
    liabilities: &[Liability],
    transactions: &[Transaction],
    config: &CreditConfig,
) -> Option<CreditMetrics> {
    let card_accounts: Vec<&Account> = accounts.iter().filter(|a| a.is_credit_card()).collect();
    if card_accounts.is_empty() {
        return None;
    }

    let cards: Vec<CardUtilization> = card_accounts
        .iter()
        .map(|account| {
            let limit = account.credit_limit.unwrap_or(0.0);
            let balance = account.current_balance.max(0.0);
            let utilization = if limit > 0.0 { balance / limit } else { 0.0 };
            CardUtilization {
                account_id: account.account_id.clone(),
                last_four: account.last_four().to_string(),
                balance,
                limit,
                utilization,
                level: UtilizationLevel::from_ratio(utilization, config),
            }
        })
        .collect();

    let has_overdue = liabilities.iter().any(|l| l.is_overdue);

    let card_ids: std::collections::HashSet<&str> = card_accounts
        .iter()
        .map(|a| a.account_id.as_str())
        .collect();

    let has_interest_charges = transactions.iter().any(|tx| {
        tx.is_expense()
            && card_ids.contains(tx.account_id.as_str())
            && (tx.merchant_name.to_uppercase().contains("INTEREST")
                || tx
                    .category
                    .as_deref()
                    .map(|c| c.to_lowercase().contains("interest"))
                    .unwrap_or(false))
    });

    let has_minimum_payment_only = cards.iter().any(|card| {
        minimum_payment_only(card, liabilities, transactions, config.minimum_payment_tolerance)
    });

    let any_medium = cards
        .iter()
        .any(|c| c.level >= UtilizationLevel::Medium);

    Some(CreditMetrics {
        cards,
        has_interest_charges,
        has_overdue,
        has_minimum_payment_only,
        meets_threshold: any_medium || has_overdue,
    })
}

/// A card is minimum-payment-only when it carries a balance and every
/// in-window payment toward it sits at or below the statement minimum
/// (within tolerance).
fn minimum_payment_only(
    card: &CardUtilization,
    liabilities: &[Liability],
    transactions: &[Transaction],
    tolerance: f64,
) -> bool {
    let Some(liability) = liabilities.iter().find(|l| l.account_id == card.account_id) else {
        return false;
    };
    let Some(minimum) = liability.minimum_payment_amount.filter(|m| *m > 0.0) else {
        return false;
    };
    if card.balance <= 0.0 {
        return false;
    }

    // Inflows on a credit account are payments toward the balance
    let payments: Vec<f64> = transactions
        .iter()
        .filter(|tx| tx.account_id == card.account_id && tx.is_inflow())
        .map(|tx| tx.amount)
        .collect();
    if payments.is_empty() {
        return false;
    }

    payments
        .iter()
        .all(|payment| *payment <= minimum + tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::models::AccountKind;
    use chrono::NaiveDate;

    fn card(id: &str, balance: f64, limit: f64) -> Account {
        Account {
            account_id: id.to_string(),
            user_id: "u1".to_string(),
            name: "Card".to_string(),
            kind: AccountKind::Credit,
            subtype: Some("credit_card".to_string()),
            available_balance: limit - balance,
            current_balance: balance,
            credit_limit: Some(limit),
        }
    }

    fn payment(id: &str, account_id: &str, amount: f64) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            account_id: account_id.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            amount,
            merchant_name: "PAYMENT THANK YOU".to_string(),
            category: Some("payment".to_string()),
            pending: false,
        }
    }

    #[test]
    fn test_no_cards_is_absent() {
        let config = EngineConfig::default();
        let accounts = vec![Account {
            account_id: "chk-1001".to_string(),
            user_id: "u1".to_string(),
            name: "Checking".to_string(),
            kind: AccountKind::Depository,
            subtype: Some("checking".to_string()),
            available_balance: 100.0,
            current_balance: 100.0,
            credit_limit: None,
        }];
        assert!(analyze_window(&accounts, &[], &[], &config.credit).is_none());
    }

    #[test]
    fn test_utilization_tiers() {
        let config = EngineConfig::default();
        assert_eq!(
            UtilizationLevel::from_ratio(0.10, &config.credit),
            UtilizationLevel::Low
        );
        assert_eq!(
            UtilizationLevel::from_ratio(0.30, &config.credit),
            UtilizationLevel::Medium
        );
        assert_eq!(
            UtilizationLevel::from_ratio(0.55, &config.credit),
            UtilizationLevel::High
        );
        assert_eq!(
            UtilizationLevel::from_ratio(0.80, &config.credit),
            UtilizationLevel::VeryHigh
        );
    }

    #[test]
    fn test_eighty_percent_card_meets_threshold() {
        let config = EngineConfig::default();
        let accounts = vec![card("card-9321", 4000.0, 5000.0)];

        let metrics = analyze_window(&accounts, &[], &[], &config.credit).unwrap();
        assert_eq!(metrics.cards.len(), 1);
        assert_eq!(metrics.cards[0].level, UtilizationLevel::VeryHigh);
        assert_eq!(metrics.cards[0].last_four, "9321");
        assert!(metrics.meets_threshold);
        assert!(!metrics.has_overdue);
        assert_eq!(metrics.highest_card().unwrap().account_id, "card-9321");
    }

    #[test]
    fn test_overdue_alone_meets_threshold() {
        let config = EngineConfig::default();
        let accounts = vec![card("card-9321", 100.0, 5000.0)];
        let liabilities = vec![Liability {
            account_id: "card-9321".to_string(),
            apr: Some(24.99),
            minimum_payment_amount: Some(35.0),
            is_overdue: true,
            last_statement_balance: Some(90.0),
            next_payment_due_date: None,
        }];

        let metrics = analyze_window(&accounts, &liabilities, &[], &config.credit).unwrap();
        assert_eq!(metrics.cards[0].level, UtilizationLevel::Low);
        assert!(metrics.has_overdue);
        assert!(metrics.meets_threshold);
    }

    #[test]
    fn test_minimum_payment_only_flag() {
        let config = EngineConfig::default();
        let accounts = vec![card("card-9321", 2000.0, 10000.0)];
        let liabilities = vec![Liability {
            account_id: "card-9321".to_string(),
            apr: Some(21.0),
            minimum_payment_amount: Some(40.0),
            is_overdue: false,
            last_statement_balance: Some(2000.0),
            next_payment_due_date: None,
        }];
        let txs = vec![payment("p1", "card-9321", 40.0)];

        let metrics = analyze_window(&accounts, &liabilities, &txs, &config.credit).unwrap();
        assert!(metrics.has_minimum_payment_only);

        // A payment well above the minimum clears the flag
        let txs = vec![payment("p2", "card-9321", 600.0)];
        let metrics = analyze_window(&accounts, &liabilities, &txs, &config.credit).unwrap();
        assert!(!metrics.has_minimum_payment_only);
    }

    #[test]
    fn test_interest_charges_detected() {
        let config = EngineConfig::default();
        let accounts = vec![card("card-9321", 500.0, 5000.0)];
        let txs = vec![Transaction {
            transaction_id: "i1".to_string(),
            account_id: "card-9321".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 28).unwrap(),
            amount: -23.10,
            merchant_name: "PURCHASE INTEREST CHARGE".to_string(),
            category: Some("interest_charged".to_string()),
            pending: false,
        }];

        let metrics = analyze_window(&accounts, &[], &txs, &config.credit).unwrap();
        assert!(metrics.has_interest_charges);
    }
}
