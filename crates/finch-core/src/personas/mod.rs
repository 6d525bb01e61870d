//! Persona catalog
//!
//! Five fixed behavioral archetypes, each with a unique static priority.
//! Definitions are configuration, loaded once; predicates and rationale
//! builders live in `matcher`, winner selection in `prioritizer`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod matcher;
pub mod prioritizer;

pub use matcher::evaluate_all;
pub use prioritizer::{DecisionTrace, MatchResult, PersonaPrioritizer};

/// Identifier for one of the five personas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaId {
    HighUtilization,
    VariableIncomeBudgeter,
    SubscriptionHeavy,
    SavingsBuilder,
    NewUser,
}

impl PersonaId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighUtilization => "high_utilization",
            Self::VariableIncomeBudgeter => "variable_income_budgeter",
            Self::SubscriptionHeavy => "subscription_heavy",
            Self::SavingsBuilder => "savings_builder",
            Self::NewUser => "new_user",
        }
    }

    pub fn definition(&self) -> &'static PersonaDefinition {
        PERSONAS
            .iter()
            .find(|p| p.id == *self)
            .expect("all persona ids are defined")
    }
}

impl std::str::FromStr for PersonaId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "high_utilization" => Ok(Self::HighUtilization),
            "variable_income_budgeter" => Ok(Self::VariableIncomeBudgeter),
            "subscription_heavy" => Ok(Self::SubscriptionHeavy),
            "savings_builder" => Ok(Self::SavingsBuilder),
            "new_user" => Ok(Self::NewUser),
            _ => Err(format!("Unknown persona: {}", s)),
        }
    }
}

impl std::fmt::Display for PersonaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static persona definition
#[derive(Debug, Clone, Serialize)]
pub struct PersonaDefinition {
    pub id: PersonaId,
    pub name: &'static str,
    /// 1-5, unique by construction; higher wins
    pub priority: u8,
    pub description: &'static str,
    /// Content tags this persona's recommendations should carry
    pub recommendation_types: &'static [&'static str],
}

/// The fixed persona catalog
pub static PERSONAS: &[PersonaDefinition] = &[
    PersonaDefinition {
        id: PersonaId::HighUtilization,
        name: "High Utilization",
        priority: 5,
        description: "Carrying meaningful credit card balances relative to limits, \
                      paying interest, or behind on payments.",
        recommendation_types: &["credit_management", "debt_paydown", "budgeting"],
    },
    PersonaDefinition {
        id: PersonaId::VariableIncomeBudgeter,
        name: "Variable Income Budgeter",
        priority: 4,
        description: "Irregular pay schedule with a thin cash buffer between deposits.",
        recommendation_types: &["income_smoothing", "budgeting", "emergency_fund"],
    },
    PersonaDefinition {
        id: PersonaId::SubscriptionHeavy,
        name: "Subscription-Heavy",
        priority: 3,
        description: "Several recurring services adding up to a noticeable share of spending.",
        recommendation_types: &["subscription_audit", "budgeting"],
    },
    PersonaDefinition {
        id: PersonaId::SavingsBuilder,
        name: "Savings Builder",
        priority: 2,
        description: "Savings growing steadily with credit kept comfortably in check.",
        recommendation_types: &["savings_growth", "emergency_fund", "investing_basics"],
    },
    PersonaDefinition {
        id: PersonaId::NewUser,
        name: "New User",
        priority: 1,
        description: "Recently joined with little linked history to analyze yet.",
        recommendation_types: &["getting_started", "budgeting"],
    },
];

/// Non-signal facts about the user that persona predicates need
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub user_created_at: DateTime<Utc>,
    pub as_of: NaiveDate,
    pub account_count: usize,
    /// Credit limits of the user's cards (empty when there are none)
    pub card_limits: Vec<f64>,
}

impl UserContext {
    pub fn account_age_days(&self) -> i64 {
        (self.as_of - self.user_created_at.date_naive()).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;

    #[test]
    fn test_priorities_are_unique_and_complete() {
        let priorities: HashSet<u8> = PERSONAS.iter().map(|p| p.priority).collect();
        assert_eq!(priorities.len(), 5);
        assert_eq!(PERSONAS.len(), 5);
        assert!(priorities.contains(&1) && priorities.contains(&5));
    }

    #[test]
    fn test_persona_id_round_trip() {
        for persona in PERSONAS {
            assert_eq!(
                PersonaId::from_str(persona.id.as_str()).unwrap(),
                persona.id
            );
            assert_eq!(persona.id.definition().priority, persona.priority);
        }
    }

    #[test]
    fn test_account_age() {
        let ctx = UserContext {
            user_created_at: "2026-05-01T00:00:00Z".parse().unwrap(),
            as_of: NaiveDate::from_ymd_opt(2026, 5, 31).unwrap(),
            account_count: 1,
            card_limits: vec![],
        };
        assert_eq!(ctx.account_age_days(), 30);
    }
}
