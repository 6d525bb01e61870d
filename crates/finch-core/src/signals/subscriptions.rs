//! Subscription signal extraction
//!
//! Groups expense transactions by normalized merchant and flags a merchant
//! as recurring when it charges at least 3 times within a 90-day span at a
//! roughly periodic cadence (weekly or monthly, with tolerance).

use serde::{Deserialize, Serialize};

use crate::config::SubscriptionConfig;
use crate::models::Transaction;

use super::{median, normalize_merchant};

/// One detected recurring merchant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringMerchant {
    pub merchant: String,
    /// Charge amount normalized to a 30-day month
    pub monthly_amount: f64,
    pub occurrences: usize,
}

/// Windowed subscription metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionMetrics {
    pub recurring_merchant_count: usize,
    pub total_monthly_recurring_spend: f64,
    /// Recurring spend divided by total spend in the window
    pub subscription_share: f64,
    pub recurring_merchants: Vec<RecurringMerchant>,
}

/// Compute subscription metrics for one window.
///
/// Returns `None` when the window holds no expense transactions.
pub fn analyze_window(
    transactions: &[Transaction],
    config: &SubscriptionConfig,
) -> Option<SubscriptionMetrics> {
    let expenses: Vec<&Transaction> = transactions.iter().filter(|tx| tx.is_expense()).collect();
    if expenses.is_empty() {
        return None;
    }

    let total_spend: f64 = expenses.iter().map(|tx| tx.amount.abs()).sum();

    // Group by normalized merchant
    let mut by_merchant: std::collections::HashMap<String, Vec<&Transaction>> =
        std::collections::HashMap::new();
    for tx in &expenses {
        by_merchant
            .entry(normalize_merchant(&tx.merchant_name))
            .or_default()
            .push(*tx);
    }

    let mut recurring_merchants = Vec::new();
    let mut recurring_window_spend = 0.0;

    for (merchant, txs) in by_merchant {
        if let Some(info) = detect_recurring_pattern(&txs, config) {
            recurring_window_spend += txs.iter().map(|tx| tx.amount.abs()).sum::<f64>();
            recurring_merchants.push(RecurringMerchant {
                merchant,
                monthly_amount: info.monthly_amount,
                occurrences: txs.len(),
            });
        }
    }

    // Stable ordering for reproducible rationale text
    recurring_merchants.sort_by(|a, b| {
        b.monthly_amount
            .partial_cmp(&a.monthly_amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.merchant.cmp(&b.merchant))
    });

    let subscription_share = if total_spend > 0.0 {
        recurring_window_spend / total_spend
    } else {
        0.0
    };

    Some(SubscriptionMetrics {
        recurring_merchant_count: recurring_merchants.len(),
        total_monthly_recurring_spend: recurring_merchants
            .iter()
            .map(|m| m.monthly_amount)
            .sum(),
        subscription_share,
        recurring_merchants,
    })
}

struct RecurringInfo {
    monthly_amount: f64,
}

/// Detect whether a merchant's charges form a recurring pattern
///
/// Requirements:
/// 1. At least `recurring_min_occurrences` charges whose dates span at most
///    `recurring_span_days`
/// 2. Intervals matching a known cadence (weekly ~7d, monthly ~30d) with at
///    least `interval_consistency` of intervals inside tolerance
fn detect_recurring_pattern(
    transactions: &[&Transaction],
    config: &SubscriptionConfig,
) -> Option<RecurringInfo> {
    if transactions.len() < config.recurring_min_occurrences {
        return None;
    }

    let mut sorted: Vec<_> = transactions.to_vec();
    sorted.sort_by_key(|tx| tx.date);

    // Find a dense-enough run: some consecutive `recurring_min_occurrences`
    // charges within the span limit
    let n = config.recurring_min_occurrences;
    let has_dense_run = sorted.windows(n).any(|run| {
        let span = (run[n - 1].date - run[0].date).num_days();
        span <= config.recurring_span_days
    });
    if !has_dense_run {
        return None;
    }

    let intervals: Vec<i64> = sorted
        .windows(2)
        .map(|w| (w[1].date - w[0].date).num_days())
        .collect();
    if intervals.is_empty() {
        return None;
    }

    let avg_interval = intervals.iter().sum::<i64>() as f64 / intervals.len() as f64;

    // Map the average interval onto a known cadence
    let (expected_interval, tolerance) = if avg_interval < 10.0 {
        (7.0, 3.0) // Weekly: expect ~7 days, allow ±3 days
    } else if avg_interval < 45.0 {
        (30.0, 7.0) // Monthly: expect ~30 days, allow ±7 days
    } else {
        return None; // Too sparse to recur within a 90-day span
    };

    let consistent = intervals
        .iter()
        .filter(|&&interval| (interval as f64 - expected_interval).abs() <= tolerance)
        .count();
    if (consistent as f64 / intervals.len() as f64) < config.interval_consistency {
        return None;
    }

    let amounts: Vec<f64> = sorted.iter().map(|tx| tx.amount.abs()).collect();
    let typical_amount = median(&amounts);

    Some(RecurringInfo {
        monthly_amount: typical_amount * (30.0 / expected_interval),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use chrono::NaiveDate;

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

    fn monthly_charges(merchant: &str, amount: f64, months: u32) -> Vec<Transaction> {
        (0..months)
            .map(|i| {
                tx(
                    &format!("{}-{}", merchant, i),
                    NaiveDate::from_ymd_opt(2026, 1 + i, 5).unwrap(),
                    -amount,
                    merchant,
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_window_is_absent() {
        let config = EngineConfig::default();
        assert!(analyze_window(&[], &config.subscriptions).is_none());

        // Inflows only - still no expense evidence
        let deposits = vec![tx(
            "d1",
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            2000.0,
            "EMPLOYER PAYROLL",
        )];
        assert!(analyze_window(&deposits, &config.subscriptions).is_none());
    }

    #[test]
    fn test_detects_monthly_subscriptions() {
        let config = EngineConfig::default();
        let mut txs = monthly_charges("NETFLIX.COM", 15.49, 5);
        txs.extend(monthly_charges("SPOTIFY USA", 10.99, 5));
        txs.extend(monthly_charges("HULU", 17.99, 5));
        // A one-off purchase is not recurring
        txs.push(tx(
            "one-off",
            NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            -230.0,
            "BEST BUY",
        ));

        let metrics = analyze_window(&txs, &config.subscriptions).unwrap();
        assert_eq!(metrics.recurring_merchant_count, 3);
        assert!((metrics.total_monthly_recurring_spend - 44.47).abs() < 0.05);
        assert!(metrics.subscription_share > 0.4);
        assert_eq!(metrics.recurring_merchants[0].merchant, "HULU");
    }

    #[test]
    fn test_irregular_charges_are_not_recurring() {
        let config = EngineConfig::default();
        // Same merchant, erratic gaps (4, 49, 12 days) - no cadence
        let dates = [(1, 5), (1, 9), (2, 27), (3, 11)];
        let txs: Vec<Transaction> = dates
            .iter()
            .enumerate()
            .map(|(i, (m, d))| {
                tx(
                    &format!("g-{}", i),
                    NaiveDate::from_ymd_opt(2026, *m, *d).unwrap(),
                    -42.0,
                    "CORNER GROCERY",
                )
            })
            .collect();

        let metrics = analyze_window(&txs, &config.subscriptions).unwrap();
        assert_eq!(metrics.recurring_merchant_count, 0);
        assert_eq!(metrics.subscription_share, 0.0);
    }

    #[test]
    fn test_weekly_cadence_normalizes_to_monthly_amount() {
        let config = EngineConfig::default();
        let txs: Vec<Transaction> = (0..6)
            .map(|i| {
                tx(
                    &format!("w-{}", i),
                    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap() + chrono::Duration::days(7 * i),
                    -12.0,
                    "BOXED MEALS",
                )
            })
            .collect();

        let metrics = analyze_window(&txs, &config.subscriptions).unwrap();
        assert_eq!(metrics.recurring_merchant_count, 1);
        // $12/week ≈ $51.43/month
        let monthly = metrics.recurring_merchants[0].monthly_amount;
        assert!((monthly - 12.0 * 30.0 / 7.0).abs() < 0.01);
    }

    #[test]
    fn test_sparse_charges_outside_span_are_not_recurring() {
        let config = EngineConfig::default();
        // Three charges 60 days apart: span 120 days > 90
        let txs: Vec<Transaction> = (0..3)
            .map(|i| {
                tx(
                    &format!("s-{}", i),
                    NaiveDate::from_ymd_opt(2026, 1, 10).unwrap() + chrono::Duration::days(60 * i),
                    -99.0,
                    "STORAGE UNIT",
                )
            })
            .collect();

        let metrics = analyze_window(&txs, &config.subscriptions).unwrap();
        assert_eq!(metrics.recurring_merchant_count, 0);
    }
}
