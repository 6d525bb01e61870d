//! Plain-language rationale generation
//!
//! Deterministic template dispatch keyed on an item's recommendation types
//! (or an offer's category). Every rationale opens with the persona framing
//! and interpolates concrete figures from the extracted signals wherever
//! the matching domain has evidence. A generic closing sentence is the
//! last-resort branch; the result is never empty.

use crate::personas::PersonaDefinition;
use crate::signals::{BehavioralSignals, UtilizationLevel};

/// What the generator needs to know about the item being explained
#[derive(Debug, Clone, Copy)]
pub struct RationaleInput<'a> {
    pub recommendation_types: &'a [String],
    /// Set for partner offers
    pub offer_category: Option<&'a str>,
}

/// Template families, in dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Template {
    Credit,
    Subscriptions,
    Savings,
    IncomeSmoothing,
    Investing,
    GettingStarted,
    Generic,
}

fn classify(input: &RationaleInput<'_>) -> Template {
    let mut tags: Vec<&str> = input
        .recommendation_types
        .iter()
        .map(|t| t.as_str())
        .collect();
    if let Some(category) = input.offer_category {
        tags.push(category);
    }

    let has = |candidates: &[&str]| tags.iter().any(|t| candidates.contains(t));

    if has(&["credit_management", "debt_paydown", "balance_transfer", "personal_loan", "credit_builder"]) {
        Template::Credit
    } else if has(&["subscription_audit", "subscription_management"]) {
        Template::Subscriptions
    } else if has(&["savings_growth", "emergency_fund", "savings_account"]) {
        Template::Savings
    } else if has(&["income_smoothing", "budgeting_tool"]) {
        Template::IncomeSmoothing
    } else if has(&["investing_basics", "investment_account"]) {
        Template::Investing
    } else if has(&["getting_started", "checking_account", "budgeting"]) {
        Template::GettingStarted
    } else {
        Template::Generic
    }
}

/// Build the rationale for one selected item
pub fn generate_rationale(
    input: &RationaleInput<'_>,
    persona: &PersonaDefinition,
    signals: &BehavioralSignals,
) -> String {
    let body = match classify(input) {
        Template::Credit => credit_body(signals),
        Template::Subscriptions => subscriptions_body(signals),
        Template::Savings => savings_body(signals),
        Template::IncomeSmoothing => income_body(signals),
        Template::Investing => investing_body(signals),
        Template::GettingStarted => getting_started_body(),
        Template::Generic => None,
    }
    .unwrap_or_else(|| "this looks like a practical next step for where you are today.".to_string());

    format!("Based on your {} profile, {}", persona.name, body)
}

fn credit_body(signals: &BehavioralSignals) -> Option<String> {
    let metrics = signals.credit.preferred()?;
    let card = metrics.highest_card()?;

    if card.level >= UtilizationLevel::Medium {
        Some(format!(
            "your card ending {} is at {:.0}% utilization (${:.0} of a ${:.0} limit), and \
             bringing that share down is the fastest lever you have.",
            card.last_four,
            card.utilization * 100.0,
            card.balance,
            card.limit
        ))
    } else if metrics.has_overdue {
        Some(
            "one of your cards has a past-due payment, and catching it up protects your \
             score before anything else matters."
                .to_string(),
        )
    } else {
        Some(format!(
            "your card ending {} is at a healthy {:.0}% utilization, and keeping it there \
             builds your score steadily.",
            card.last_four,
            card.utilization * 100.0
        ))
    }
}

fn subscriptions_body(signals: &BehavioralSignals) -> Option<String> {
    let metrics = signals.subscriptions.preferred()?;
    if metrics.recurring_merchant_count == 0 {
        return None;
    }
    let top = metrics
        .recurring_merchants
        .first()
        .map(|m| format!(" {} alone runs ${:.0} a month.", m.merchant, m.monthly_amount))
        .unwrap_or_default();
    Some(format!(
        "{} recurring services total about ${:.0} per month of your spending.{}",
        metrics.recurring_merchant_count, metrics.total_monthly_recurring_spend, top
    ))
}

fn savings_body(signals: &BehavioralSignals) -> Option<String> {
    let metrics = signals.savings.preferred()?;
    if metrics.emergency_fund_coverage_months < 120.0 {
        Some(format!(
            "your savings of ${:.0} cover about {:.1} months of typical expenses, and \
             this helps stretch that further.",
            metrics.savings_balance, metrics.emergency_fund_coverage_months
        ))
    } else {
        Some(format!(
            "you added ${:.0} to savings over the period, and putting it to work matters.",
            metrics.net_inflow
        ))
    }
}

fn income_body(signals: &BehavioralSignals) -> Option<String> {
    let metrics = signals.income.preferred()?;
    let gap = metrics.median_pay_gap_days?;
    Some(format!(
        "your deposits arrive about {:.0} days apart with {:.1} months of cash on hand \
         between them, and a plan built around that rhythm holds up better.",
        gap, metrics.cash_flow_buffer_months
    ))
}

fn investing_body(signals: &BehavioralSignals) -> Option<String> {
    let metrics = signals.savings.preferred()?;
    if metrics.savings_balance <= 0.0 {
        return None;
    }
    Some(format!(
        "with ${:.0} already set aside and {:.1} months of expenses covered, a first \
         step into investing fits your pace.",
        metrics.savings_balance, metrics.emergency_fund_coverage_months
    ))
}

fn getting_started_body() -> Option<String> {
    Some(
        "you are early in building your financial picture, and this is a solid first \
         building block."
            .to_string(),
    )
}
