//! Persona predicates and rationale builders
//!
//! Every predicate is evaluated on every call - never short-circuited - so
//! the complete match set is available for the decision trace. Rationales
//! cite figures from the same window that satisfied the predicate.

use crate::config::EngineConfig;
use crate::signals::{BehavioralSignals, CreditMetrics, UtilizationLevel, Window};

use super::prioritizer::MatchResult;
use super::{PersonaId, UserContext, PERSONAS};

/// Evaluate all five persona predicates against the extracted signals.
///
/// Returns one `MatchResult` per true predicate, in catalog order.
pub fn evaluate_all(
    signals: &BehavioralSignals,
    ctx: &UserContext,
    config: &EngineConfig,
) -> Vec<MatchResult> {
    PERSONAS
        .iter()
        .filter_map(|persona| {
            let rationale = match persona.id {
                PersonaId::HighUtilization => match_high_utilization(signals),
                PersonaId::VariableIncomeBudgeter => {
                    match_variable_income_budgeter(signals, config)
                }
                PersonaId::SubscriptionHeavy => match_subscription_heavy(signals, config),
                PersonaId::SavingsBuilder => match_savings_builder(signals, config),
                PersonaId::NewUser => match_new_user(ctx, config),
            };
            rationale.map(|rationale| MatchResult {
                persona: persona.id,
                priority: persona.priority,
                rationale,
            })
        })
        .collect()
}

fn describe_window(window: Window) -> &'static str {
    match window {
        Window::ShortTerm => "the last 30 days",
        Window::LongTerm => "the last 6 months",
    }
}

/// High Utilization: any card at or above the medium tier, interest
/// charges, minimum-payment-only behavior, or an overdue liability.
fn match_high_utilization(signals: &BehavioralSignals) -> Option<String> {
    let (window, metrics) = signals.credit.window_satisfying(|m: &CreditMetrics| {
        m.any_card_at_or_above(UtilizationLevel::Medium)
            || m.has_interest_charges
            || m.has_minimum_payment_only
            || m.has_overdue
    })?;

    let mut reasons: Vec<String> = Vec::new();
    if let Some(card) = metrics.highest_card() {
        if card.level >= UtilizationLevel::Medium {
            reasons.push(format!(
                "your card ending {} is carrying ${:.0} of its ${:.0} limit ({:.0}% utilization)",
                card.last_four,
                card.balance,
                card.limit,
                card.utilization * 100.0
            ));
        }
    }
    if metrics.has_overdue {
        reasons.push("a card payment is past due".to_string());
    }
    if metrics.has_interest_charges {
        reasons.push(format!(
            "interest charges appeared in {}",
            describe_window(window)
        ));
    }
    if metrics.has_minimum_payment_only {
        reasons.push("recent payments covered only the statement minimum".to_string());
    }

    if reasons.is_empty() {
        // meets_threshold without a nameable reason should not happen;
        // fall back to a generic but truthful line
        reasons.push("your credit activity shows signs of balance pressure".to_string());
    }

    Some(format!("Over {}, {}.", describe_window(window), reasons.join(", and ")))
}

/// Variable Income Budgeter: long pay gaps AND a thin buffer, both
/// observed on the same window.
fn match_variable_income_budgeter(
    signals: &BehavioralSignals,
    config: &EngineConfig,
) -> Option<String> {
    let (window, metrics) = signals.income.window_satisfying(|m| {
        m.median_pay_gap_days
            .map(|gap| gap > config.income.variable_pay_gap_days)
            .unwrap_or(false)
            && m.cash_flow_buffer_months < config.income.low_buffer_months
    })?;

    let gap = metrics.median_pay_gap_days.unwrap_or(0.0);
    Some(format!(
        "In {}, your deposits arrived about {:.0} days apart while your cash on hand covered \
         {:.1} months of typical spending.",
        describe_window(window),
        gap,
        metrics.cash_flow_buffer_months
    ))
}

/// Subscription-Heavy: several recurring merchants and meaningful
/// recurring spend or share.
fn match_subscription_heavy(signals: &BehavioralSignals, config: &EngineConfig) -> Option<String> {
    let sub = &config.subscriptions;
    let (window, metrics) = signals.subscriptions.window_satisfying(|m| {
        m.recurring_merchant_count >= sub.heavy_min_merchants
            && (m.total_monthly_recurring_spend >= sub.heavy_min_monthly_spend
                || m.subscription_share >= sub.heavy_min_share)
    })?;

    Some(format!(
        "Over {}, {} recurring services added up to about ${:.0} per month \
         ({:.0}% of your spending).",
        describe_window(window),
        metrics.recurring_merchant_count,
        metrics.total_monthly_recurring_spend,
        metrics.subscription_share * 100.0
    ))
}

/// Savings Builder: growing savings or steady inflow, with every card
/// kept under the medium utilization tier (vacuously true without cards).
fn match_savings_builder(signals: &BehavioralSignals, config: &EngineConfig) -> Option<String> {
    let cards_in_check = signals
        .credit
        .preferred()
        .map(|m| m.all_cards_below(UtilizationLevel::Medium))
        .unwrap_or(true);
    if !cards_in_check {
        return None;
    }

    let sav = &config.savings;
    let (window, metrics) = signals.savings.window_satisfying(|m| {
        m.growth_rate >= sav.builder_min_growth_rate
            || m.monthly_net_inflow >= sav.builder_min_monthly_inflow
    })?;

    let line = if metrics.growth_rate >= sav.builder_min_growth_rate {
        format!(
            "your savings grew {:.1}% over {}",
            metrics.growth_rate * 100.0,
            describe_window(window)
        )
    } else {
        format!(
            "you set aside about ${:.0} per month over {}",
            metrics.monthly_net_inflow,
            describe_window(window)
        )
    };

    Some(format!(
        "{}, and your credit cards stayed comfortably below 30% of their limits.",
        capitalize(&line)
    ))
}

/// New User: young account, at most two linked accounts, and no
/// established credit line.
fn match_new_user(ctx: &UserContext, config: &EngineConfig) -> Option<String> {
    let nu = &config.new_user;
    let young = ctx.account_age_days() <= nu.max_account_age_days;
    let small_credit =
        ctx.card_limits.is_empty() || ctx.card_limits.iter().all(|l| *l < nu.max_card_limit);
    let few_accounts = ctx.account_count <= nu.max_accounts;

    if !(young && small_credit && few_accounts) {
        return None;
    }

    Some(format!(
        "You joined {} days ago with {} linked {} - not enough history yet for a \
         deeper read, so we start with the basics.",
        ctx.account_age_days(),
        ctx.account_count,
        if ctx.account_count == 1 { "account" } else { "accounts" }
    ))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
