//! Income signal extraction
//!
//! Detects payroll-like deposits into depository accounts, measures the gap
//! between consecutive pay events, and sizes the liquid cash buffer against
//! average monthly expenses.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::config::IncomeConfig;
use crate::models::{Account, Transaction};

use super::{average_monthly_expenses, median};

/// Windowed income metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeMetrics {
    pub payroll_deposit_count: usize,
    /// Median days between consecutive payroll deposits; `None` with fewer
    /// than two deposits in the window
    pub median_pay_gap_days: Option<f64>,
    /// Liquid depository balance divided by average monthly expenses
    pub cash_flow_buffer_months: f64,
    pub has_variable_income: bool,
    pub average_monthly_income: f64,
}

fn payroll_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(payroll|direct\s?deposit|salary|paycheck|wages|employer)\b")
            .expect("payroll pattern must compile")
    })
}

/// Whether a transaction looks like a pay event
fn is_payroll_deposit(tx: &Transaction, config: &IncomeConfig) -> bool {
    if !tx.is_inflow() {
        return false;
    }
    if payroll_pattern().is_match(&tx.merchant_name) {
        return true;
    }
    if let Some(category) = tx.category.as_deref() {
        if payroll_pattern().is_match(category) {
            return true;
        }
    }
    tx.amount >= config.payroll_amount_floor
}

/// Compute income metrics for one window.
///
/// Returns `None` when the window holds no payroll-like deposits.
pub fn analyze_window(
    accounts: &[Account],
    transactions: &[Transaction],
    config: &IncomeConfig,
    window_days: i64,
) -> Option<IncomeMetrics> {
    let depository_ids: std::collections::HashSet<&str> = accounts
        .iter()
        .filter(|a| a.is_depository())
        .map(|a| a.account_id.as_str())
        .collect();

    let mut deposits: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| depository_ids.contains(tx.account_id.as_str()))
        .filter(|tx| is_payroll_deposit(tx, config))
        .collect();
    if deposits.is_empty() {
        return None;
    }
    deposits.sort_by_key(|tx| tx.date);

    // Collapse same-day deposits into one pay event (split direct deposits)
    let mut pay_dates: Vec<NaiveDate> = Vec::new();
    for tx in &deposits {
        if pay_dates.last() != Some(&tx.date) {
            pay_dates.push(tx.date);
        }
    }

    let gaps: Vec<f64> = pay_dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();

    let median_pay_gap_days = if gaps.is_empty() {
        None
    } else {
        Some(median(&gaps))
    };

    // Variable income: gaps scatter too far from their own median
    let has_variable_income = match median_pay_gap_days {
        Some(median_gap) if gaps.len() >= 2 && median_gap > 0.0 => {
            let mad =
                gaps.iter().map(|g| (g - median_gap).abs()).sum::<f64>() / gaps.len() as f64;
            mad / median_gap > config.gap_irregularity_ratio
        }
        _ => false,
    };

    let liquid_balance: f64 = accounts
        .iter()
        .filter(|a| a.is_depository())
        .map(|a| a.available_balance)
        .sum();

    let monthly_expenses = average_monthly_expenses(transactions, window_days);
    let cash_flow_buffer_months = if monthly_expenses >= 1.0 {
        liquid_balance / monthly_expenses
    } else {
        120.0
    };

    let months = window_days as f64 / 30.0;
    let total_income: f64 = deposits.iter().map(|tx| tx.amount).sum();
    let average_monthly_income = if months > 0.0 { total_income / months } else { 0.0 };

    Some(IncomeMetrics {
        payroll_deposit_count: deposits.len(),
        median_pay_gap_days,
        cash_flow_buffer_months,
        has_variable_income,
        average_monthly_income,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::models::AccountKind;

    fn checking(balance: f64) -> Account {
        Account {
            account_id: "chk-1001".to_string(),
            user_id: "u1".to_string(),
            name: "Checking".to_string(),
            kind: AccountKind::Depository,
            subtype: Some("checking".to_string()),
            available_balance: balance,
            current_balance: balance,
            credit_limit: None,
        }
    }

    fn tx(id: &str, date: NaiveDate, amount: f64, merchant: &str) -> Transaction {
        Transaction {
            transaction_id: id.to_string(),
            account_id: "chk-1001".to_string(),
            date,
            amount,
            merchant_name: merchant.to_string(),
            category: None,
            pending: false,
        }
    }

    fn deposits_every(days: i64, count: usize, amount: f64) -> Vec<Transaction> {
        (0..count)
            .map(|i| {
                tx(
                    &format!("pay-{}", i),
                    NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()
                        + chrono::Duration::days(days * i as i64),
                    amount,
                    "ACME CORP PAYROLL",
                )
            })
            .collect()
    }

    #[test]
    fn test_no_deposits_is_absent() {
        let config = EngineConfig::default();
        let accounts = vec![checking(1000.0)];
        let txs = vec![tx(
            "t1",
            NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(),
            -75.0,
            "GROCERY OUTLET",
        )];
        assert!(analyze_window(&accounts, &txs, &config.income, 30).is_none());
    }

    #[test]
    fn test_biweekly_payroll_gap() {
        let config = EngineConfig::default();
        let accounts = vec![checking(3000.0)];
        let txs = deposits_every(14, 6, 2100.0);

        let metrics = analyze_window(&accounts, &txs, &config.income, 90).unwrap();
        assert_eq!(metrics.payroll_deposit_count, 6);
        assert_eq!(metrics.median_pay_gap_days, Some(14.0));
        assert!(!metrics.has_variable_income);
        assert!((metrics.average_monthly_income - 2100.0 * 6.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_description_match_beats_amount_floor() {
        let config = EngineConfig::default();
        let accounts = vec![checking(500.0)];
        // $180 gig deposits - below the floor, but described as wages
        let txs = vec![
            tx("g1", NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(), 180.0, "RIDESHARE WAGES"),
            tx("g2", NaiveDate::from_ymd_opt(2026, 3, 18).unwrap(), 180.0, "RIDESHARE WAGES"),
        ];

        let metrics = analyze_window(&accounts, &txs, &config.income, 30).unwrap();
        assert_eq!(metrics.payroll_deposit_count, 2);
    }

    #[test]
    fn test_irregular_gaps_mark_variable_income() {
        let config = EngineConfig::default();
        let accounts = vec![checking(400.0)];
        // Gaps of 10, 52, and 18 days
        let dates = [(1, 5), (1, 15), (3, 8), (3, 26)];
        let txs: Vec<Transaction> = dates
            .iter()
            .enumerate()
            .map(|(i, (m, d))| {
                tx(
                    &format!("v-{}", i),
                    NaiveDate::from_ymd_opt(2026, *m, *d).unwrap(),
                    900.0,
                    "CLIENT INVOICE",
                )
            })
            .collect();

        let metrics = analyze_window(&accounts, &txs, &config.income, 180).unwrap();
        assert!(metrics.has_variable_income);
        assert_eq!(metrics.median_pay_gap_days, Some(18.0));
    }

    #[test]
    fn test_cash_flow_buffer() {
        let config = EngineConfig::default();
        let accounts = vec![checking(1200.0)];
        let mut txs = deposits_every(30, 2, 2400.0);
        txs.push(tx("e1", NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(), -2400.0, "RENT LLC"));

        let metrics = analyze_window(&accounts, &txs, &config.income, 60).unwrap();
        // $1,200 liquid vs $1,200/month of spend
        assert!((metrics.cash_flow_buffer_months - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_day_split_deposits_are_one_pay_event() {
        let config = EngineConfig::default();
        let accounts = vec![checking(2000.0)];
        let date_a = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let date_b = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let txs = vec![
            tx("s1", date_a, 1000.0, "ACME PAYROLL"),
            tx("s2", date_a, 500.0, "ACME PAYROLL"),
            tx("s3", date_b, 1500.0, "ACME PAYROLL"),
        ];

        let metrics = analyze_window(&accounts, &txs, &config.income, 30).unwrap();
        // One 14-day gap between the two pay dates
        assert_eq!(metrics.median_pay_gap_days, Some(14.0));
    }
}
