//! Savings signal extraction
//!
//! Net inflow and growth over depository accounts, plus emergency fund
//! coverage. Only transaction history is available, so the window's
//! starting balance is estimated as current balance minus in-window net
//! inflow.

use serde::{Deserialize, Serialize};

use crate::models::{Account, Transaction};

use super::average_monthly_expenses;

/// Windowed savings metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsMetrics {
    /// Net inflow across depository accounts over the window
    pub net_inflow: f64,
    /// Net inflow normalized to a 30-day month
    pub monthly_net_inflow: f64,
    /// Balance growth over the window divided by the estimated starting balance
    pub growth_rate: f64,
    /// Savings-subtype balance divided by average monthly expenses
    pub emergency_fund_coverage_months: f64,
    pub savings_balance: f64,
}

/// Compute savings metrics for one window.
///
/// Returns `None` when the window holds no depository transactions.
pub fn analyze_window(
    accounts: &[Account],
    transactions: &[Transaction],
    window_days: i64,
) -> Option<SavingsMetrics> {
    let depository_ids: std::collections::HashSet<&str> = accounts
        .iter()
        .filter(|a| a.is_depository())
        .map(|a| a.account_id.as_str())
        .collect();

    let depository_txs: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| depository_ids.contains(tx.account_id.as_str()))
        .collect();
    if depository_txs.is_empty() {
        return None;
    }

    let net_inflow: f64 = depository_txs.iter().map(|tx| tx.amount).sum();
    let months = window_days as f64 / 30.0;
    let monthly_net_inflow = if months > 0.0 { net_inflow / months } else { 0.0 };

    let depository_balance: f64 = accounts
        .iter()
        .filter(|a| a.is_depository())
        .map(|a| a.current_balance)
        .sum();

    // Estimated balance at the start of the window
    let starting_balance = depository_balance - net_inflow;
    let growth_rate = if starting_balance >= 1.0 {
        net_inflow / starting_balance
    } else {
        0.0
    };

    let savings_balance: f64 = accounts
        .iter()
        .filter(|a| a.is_savings())
        .map(|a| a.current_balance)
        .sum();

    let monthly_expenses = average_monthly_expenses(transactions, window_days);
    let emergency_fund_coverage_months = if monthly_expenses >= 1.0 {
        savings_balance / monthly_expenses
    } else {
        // No meaningful expense history; cap rather than divide by ~zero
        120.0
    };

    Some(SavingsMetrics {
        net_inflow,
        monthly_net_inflow,
        growth_rate,
        emergency_fund_coverage_months,
        savings_balance,
    })
}
