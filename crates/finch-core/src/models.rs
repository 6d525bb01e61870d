//! Domain models for Finch

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// An end user of the recommendation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub name: String,
    /// Whether the user has granted consent for behavioral analysis.
    /// Every engine entry point checks this before touching transaction data.
    pub consent_granted: bool,
    pub created_at: DateTime<Utc>,
}

/// A financial account linked to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub user_id: String,
    pub name: String,
    pub kind: AccountKind,
    /// Institution-reported subtype (e.g. "checking", "savings", "credit_card")
    pub subtype: Option<String>,
    pub available_balance: f64,
    pub current_balance: f64,
    /// Only present for credit accounts
    pub credit_limit: Option<f64>,
}

impl Account {
    /// Last four characters of the account id, for user-facing text
    pub fn last_four(&self) -> &str {
        let id = self.account_id.as_str();
        let start = id.len().saturating_sub(4);
        &id[start..]
    }

    pub fn is_credit_card(&self) -> bool {
        self.kind == AccountKind::Credit
    }

    pub fn is_depository(&self) -> bool {
        self.kind == AccountKind::Depository
    }

    /// Whether this is a savings-style depository account
    pub fn is_savings(&self) -> bool {
        self.kind == AccountKind::Depository
            && self
                .subtype
                .as_deref()
                .map(|s| {
                    let s = s.to_lowercase();
                    s.contains("savings") || s.contains("money_market") || s.contains("cd")
                })
                .unwrap_or(false)
    }
}

/// Top-level account classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Depository,
    Credit,
    Loan,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Depository => "depository",
            Self::Credit => "credit",
            Self::Loan => "loan",
        }
    }
}

impl std::str::FromStr for AccountKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "depository" => Ok(Self::Depository),
            "credit" => Ok(Self::Credit),
            "loan" => Ok(Self::Loan),
            _ => Err(format!("Unknown account kind: {}", s)),
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub account_id: String,
    pub date: NaiveDate,
    /// Negative = expense/outflow, positive = income/inflow
    pub amount: f64,
    pub merchant_name: String,
    pub category: Option<String>,
    pub pending: bool,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_inflow(&self) -> bool {
        self.amount > 0.0
    }
}

/// Liability detail attached to a credit account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Liability {
    pub account_id: String,
    pub apr: Option<f64>,
    pub minimum_payment_amount: Option<f64>,
    pub is_overdue: bool,
    pub last_statement_balance: Option<f64>,
    pub next_payment_due_date: Option<NaiveDate>,
}

/// Review state of a persisted decision trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Flagged,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Flagged => "flagged",
        }
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "flagged" => Ok(Self::Flagged),
            _ => Err(format!("Unknown review status: {}", s)),
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decision trace persisted to the operator review queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTrace {
    pub id: i64,
    pub user_id: String,
    pub selected_persona: String,
    pub selection_reason: String,
    /// Full serialized `DecisionTrace`
    pub payload: serde_json::Value,
    pub review_status: ReviewStatus,
    pub reviewer_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_account_kind_round_trip() {
        assert_eq!(AccountKind::from_str("credit").unwrap(), AccountKind::Credit);
        assert_eq!(AccountKind::Depository.as_str(), "depository");
        assert!(AccountKind::from_str("brokerage").is_err());
    }

    #[test]
    fn test_last_four() {
        let acct = Account {
            account_id: "acct-9321".to_string(),
            user_id: "u1".to_string(),
            name: "Card".to_string(),
            kind: AccountKind::Credit,
            subtype: Some("credit_card".to_string()),
            available_balance: 0.0,
            current_balance: 0.0,
            credit_limit: Some(5000.0),
        };
        assert_eq!(acct.last_four(), "9321");
    }

    #[test]
    fn test_is_savings_subtype() {
        let mut acct = Account {
            account_id: "a1".to_string(),
            user_id: "u1".to_string(),
            name: "Savings".to_string(),
            kind: AccountKind::Depository,
            subtype: Some("savings".to_string()),
            available_balance: 100.0,
            current_balance: 100.0,
            credit_limit: None,
        };
        assert!(acct.is_savings());
        acct.subtype = Some("checking".to_string());
        assert!(!acct.is_savings());
    }
}
