//! Partner-offer eligibility
//!
//! A hard prohibited-product blocklist runs first and short-circuits; the
//! soft checks (income, credit score, utilization, excluded account types)
//! run only for offers that specify them.
//!
//! Income and credit score are ESTIMATES derived from behavioral signals,
//! not bureau or payroll ground truth. The approximation is deliberate -
//! this system has no credit-bureau integration - and downstream copy must
//! present these numbers as estimates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::PartnerOffer;
use crate::models::Account;
use crate::signals::{BehavioralSignals, UtilizationLevel};

/// Products never surfaced regardless of any other criteria
const PROHIBITED_KEYWORDS: &[&str] = &[
    "payday",
    "title loan",
    "pawn",
    "cash advance",
    "rent-to-own",
    "rent to own",
    "check cashing",
    "bail bond",
    "refund advance",
    "high-interest installment",
];

/// Behavioral estimates used by the soft checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialProfile {
    /// Payroll deposits annualized; `None` without income evidence
    pub estimated_annual_income: Option<f64>,
    /// Heuristic score band anchored at 680
    pub estimated_credit_score: u16,
    /// Highest card utilization; `None` without cards
    pub max_utilization: Option<f64>,
}

/// Derive the eligibility profile from extracted signals.
///
/// The score heuristic is coarse on purpose: overdue accounts pull the
/// estimate to 590, heavy revolving use to 650, light use with growing
/// savings pushes it to 720.
pub fn estimate_financial_profile(signals: &BehavioralSignals) -> FinancialProfile {
    let estimated_annual_income = signals
        .income
        .preferred()
        .map(|m| m.average_monthly_income * 12.0);

    let credit = signals.credit.preferred();
    let max_utilization = credit.and_then(|m| m.highest_card().map(|c| c.utilization));

    let estimated_credit_score = match credit {
        Some(m) if m.has_overdue => 590,
        Some(m) if m.any_card_at_or_above(UtilizationLevel::High) => 650,
        Some(m) if m.any_card_at_or_above(UtilizationLevel::Medium) => 660,
        _ => {
            let saving_well = signals
                .savings
                .preferred()
                .map(|m| m.growth_rate > 0.0)
                .unwrap_or(false);
            let cards_clean = credit
                .map(|m| m.all_cards_below(UtilizationLevel::Medium))
                .unwrap_or(false);
            if saving_well && cards_clean {
                720
            } else {
                680
            }
        }
    };

    FinancialProfile {
        estimated_annual_income,
        estimated_credit_score,
        max_utilization,
    }
}

/// Result of an eligibility evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityCheck {
    pub is_eligible: bool,
    /// Checks that passed, for the audit trail
    pub reasons: Vec<String>,
    /// Checks that failed
    pub disqualifiers: Vec<String>,
}

/// Whether an offer matches the prohibited-product blocklist
pub fn is_prohibited_product(offer: &PartnerOffer) -> bool {
    prohibited_keyword(offer).is_some()
}

fn prohibited_keyword(offer: &PartnerOffer) -> Option<&'static str> {
    // Underscored categories like "payday_loan" must match "payday loan"
    let haystacks = [
        offer.offer_category.to_lowercase().replace('_', " "),
        offer.title.to_lowercase(),
        offer.description.to_lowercase(),
    ];
    PROHIBITED_KEYWORDS.iter().copied().find(|keyword| {
        haystacks
            .iter()
            .any(|haystack| haystack.contains(keyword))
    })
}

/// Case-insensitive substring/base-keyword match between an excluded type
/// and an account's kind/subtype strings, so "savings_account" excludes
/// both "savings" and "savings_account" subtypes.
fn matches_excluded_type(excluded: &str, account: &Account) -> bool {
    let excluded = excluded.to_lowercase();
    let mut candidates = vec![account.kind.as_str().to_string()];
    if let Some(subtype) = account.subtype.as_deref() {
        candidates.push(subtype.to_lowercase());
    }
    candidates
        .iter()
        .any(|candidate| excluded.contains(candidate.as_str()) || candidate.contains(&excluded))
}

/// Evaluate one offer against a user's estimated profile and accounts.
///
/// The prohibited-product check always runs first and short-circuits.
pub fn check_eligibility(
    offer: &PartnerOffer,
    profile: &FinancialProfile,
    accounts: &[Account],
) -> EligibilityCheck {
    if let Some(keyword) = prohibited_keyword(offer) {
        debug!(offer = offer.id, keyword, "Offer blocked by prohibited-product list");
        return EligibilityCheck {
            is_eligible: false,
            reasons: vec![],
            disqualifiers: vec![format!(
                "Offer matches prohibited product keyword \"{}\"",
                keyword
            )],
        };
    }

    let mut reasons = Vec::new();
    let mut disqualifiers = Vec::new();

    let Some(requirements) = offer.eligibility.as_ref() else {
        return EligibilityCheck {
            is_eligible: true,
            reasons: vec!["Offer specifies no eligibility requirements".to_string()],
            disqualifiers,
        };
    };

    if let Some(min_income) = requirements.min_annual_income {
        match profile.estimated_annual_income {
            Some(income) if income >= min_income => {
                reasons.push(format!(
                    "Estimated annual income ${:.0} meets the ${:.0} minimum",
                    income, min_income
                ));
            }
            Some(income) => {
                disqualifiers.push(format!(
                    "Estimated annual income ${:.0} is below the ${:.0} minimum",
                    income, min_income
                ));
            }
            None => {
                disqualifiers.push(format!(
                    "Annual income could not be estimated; offer requires at least ${:.0}",
                    min_income
                ));
            }
        }
    }

    if let Some(min_score) = requirements.min_credit_score {
        if profile.estimated_credit_score >= min_score {
            reasons.push(format!(
                "Estimated credit score {} meets the {} minimum",
                profile.estimated_credit_score, min_score
            ));
        } else {
            disqualifiers.push(format!(
                "Estimated credit score {} is below the {} minimum",
                profile.estimated_credit_score, min_score
            ));
        }
    }

    if let Some(max_utilization) = requirements.max_utilization {
        match profile.max_utilization {
            Some(utilization) if utilization > max_utilization => {
                disqualifiers.push(format!(
                    "Card utilization {:.0}% exceeds the {:.0}% maximum",
                    utilization * 100.0,
                    max_utilization * 100.0
                ));
            }
            Some(utilization) => {
                reasons.push(format!(
                    "Card utilization {:.0}% is within the {:.0}% maximum",
                    utilization * 100.0,
                    max_utilization * 100.0
                ));
            }
            // No cards - nothing can exceed the cap
            None => reasons.push("No card utilization to evaluate".to_string()),
        }
    }

    for excluded in &requirements.excluded_account_types {
        if let Some(account) = accounts
            .iter()
            .find(|account| matches_excluded_type(excluded, account))
        {
            disqualifiers.push(format!(
                "Existing {} account \"{}\" matches excluded type \"{}\"",
                account
                    .subtype
                    .as_deref()
                    .unwrap_or(account.kind.as_str()),
                account.name,
                excluded
            ));
        }
    }

    EligibilityCheck {
        is_eligible: disqualifiers.is_empty(),
        reasons,
        disqualifiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OfferEligibility;
    use crate::models::AccountKind;

    fn offer(category: &str, eligibility: Option<OfferEligibility>) -> PartnerOffer {
        PartnerOffer {
            id: "test-offer".to_string(),
            title: "Test Offer".to_string(),
            description: "A test offer".to_string(),
            partner_name: "Test Partner".to_string(),
            offer_category: category.to_string(),
            persona_fit: vec![],
            recommendation_types: vec![],
            eligibility,
        }
    }

    fn profile(income: Option<f64>, score: u16, utilization: Option<f64>) -> FinancialProfile {
        FinancialProfile {
            estimated_annual_income: income,
            estimated_credit_score: score,
            max_utilization: utilization,
        }
    }

    fn savings_account() -> Account {
        Account {
            account_id: "sav-2001".to_string(),
            user_id: "u1".to_string(),
            name: "Rainy Day".to_string(),
            kind: AccountKind::Depository,
            subtype: Some("savings".to_string()),
            available_balance: 5000.0,
            current_balance: 5000.0,
            credit_limit: None,
        }
    }

    #[test]
    fn test_payday_loan_always_blocked() {
        // Otherwise-satisfied criteria do not matter
        let offer = offer(
            "payday_loan",
            Some(OfferEligibility {
                min_annual_income: Some(10000.0),
                ..Default::default()
            }),
        );
        let check = check_eligibility(&offer, &profile(Some(80000.0), 780, None), &[]);
        assert!(!check.is_eligible);
        assert!(!check.disqualifiers.is_empty());
        assert!(check.disqualifiers[0].contains("payday"));
    }

    #[test]
    fn test_prohibited_keyword_in_title() {
        let mut blocked = offer("personal_loan", None);
        blocked.title = "Fast Cash Advance Today".to_string();
        assert!(is_prohibited_product(&blocked));
    }

    #[test]
    fn test_income_check() {
        let offer = offer(
            "personal_loan",
            Some(OfferEligibility {
                min_annual_income: Some(36000.0),
                ..Default::default()
            }),
        );

        let check = check_eligibility(&offer, &profile(Some(48000.0), 680, None), &[]);
        assert!(check.is_eligible);
        assert!(check.reasons.iter().any(|r| r.contains("48000")));

        let check = check_eligibility(&offer, &profile(Some(20000.0), 680, None), &[]);
        assert!(!check.is_eligible);

        // Unknown income cannot satisfy a required minimum
        let check = check_eligibility(&offer, &profile(None, 680, None), &[]);
        assert!(!check.is_eligible);
        assert!(check.disqualifiers[0].contains("could not be estimated"));
    }

    #[test]
    fn test_utilization_cap_with_no_cards_passes() {
        let offer = offer(
            "investment_account",
            Some(OfferEligibility {
                max_utilization: Some(0.5),
                ..Default::default()
            }),
        );
        let check = check_eligibility(&offer, &profile(None, 680, None), &[]);
        assert!(check.is_eligible);

        let check = check_eligibility(&offer, &profile(None, 650, Some(0.8)), &[]);
        assert!(!check.is_eligible);
    }

    #[test]
    fn test_excluded_account_type_base_keyword() {
        let offer = offer(
            "savings_account",
            Some(OfferEligibility {
                excluded_account_types: vec!["savings_account".to_string()],
                ..Default::default()
            }),
        );

        // Subtype "savings" matches excluded "savings_account"
        let check = check_eligibility(&offer, &profile(None, 680, None), &[savings_account()]);
        assert!(!check.is_eligible);
        assert!(check.disqualifiers[0].contains("savings"));

        // Subtype "savings_account" matches too
        let mut account = savings_account();
        account.subtype = Some("savings_account".to_string());
        let check = check_eligibility(&offer, &profile(None, 680, None), &[account]);
        assert!(!check.is_eligible);

        // A checking-only user qualifies
        let mut checking = savings_account();
        checking.subtype = Some("checking".to_string());
        let check = check_eligibility(&offer, &profile(None, 680, None), &[checking]);
        assert!(check.is_eligible);
    }

    #[test]
    fn test_no_requirements_is_eligible() {
        let offer = offer("budgeting_tool", None);
        let check = check_eligibility(&offer, &profile(None, 590, Some(0.95)), &[]);
        assert!(check.is_eligible);
    }
}
