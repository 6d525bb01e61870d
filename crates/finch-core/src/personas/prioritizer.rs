//! Winner-take-all persona selection
//!
//! Collects every true predicate into a match list, then picks the single
//! highest-priority match. Priorities are unique by construction, so ties
//! cannot happen. The full match list is retained for the audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::signals::BehavioralSignals;

use super::PersonaId;

/// One persona whose predicate held for this user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub persona: PersonaId,
    pub priority: u8,
    /// Plain-language evidence, citing figures from the matching window
    pub rationale: String,
}

/// The recorded decision, persisted for operator audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTrace {
    pub timestamp: DateTime<Utc>,
    pub all_matches: Vec<MatchResult>,
    pub selected_persona: PersonaId,
    pub selection_reason: String,
    /// SHA-256 over the serialized signals; two traces with the same
    /// fingerprint were computed from identical evidence
    pub signal_fingerprint: String,
}

/// Outcome of prioritization
#[derive(Debug, Clone)]
pub struct Selection {
    pub persona: PersonaId,
    pub rationale: String,
    pub selection_reason: String,
}

pub struct PersonaPrioritizer;

impl PersonaPrioritizer {
    /// Pick the single winner by static priority.
    ///
    /// An empty match list falls back to New User; the orchestrator always
    /// produces exactly one persona.
    pub fn select(matches: &[MatchResult]) -> Selection {
        match matches.iter().max_by_key(|m| m.priority) {
            Some(winner) => Selection {
                persona: winner.persona,
                rationale: winner.rationale.clone(),
                selection_reason: format!(
                    "Selected {} (priority {}) out of {} matching persona{}",
                    winner.persona,
                    winner.priority,
                    matches.len(),
                    if matches.len() == 1 { "" } else { "s" }
                ),
            },
            None => Selection {
                persona: PersonaId::NewUser,
                rationale: "No clear behavioral pattern stood out yet, so we start with \
                            the basics while more history accumulates."
                    .to_string(),
                selection_reason: "No persona predicates matched; defaulted to New User"
                    .to_string(),
            },
        }
    }

    /// Build the audit trace for a selection
    pub fn build_trace(
        matches: Vec<MatchResult>,
        selection: &Selection,
        signals: &BehavioralSignals,
    ) -> Result<DecisionTrace> {
        Ok(DecisionTrace {
            timestamp: Utc::now(),
            all_matches: matches,
            selected_persona: selection.persona,
            selection_reason: selection.selection_reason.clone(),
            signal_fingerprint: signal_fingerprint(signals)?,
        })
    }
}

/// SHA-256 fingerprint of the serialized signals
pub fn signal_fingerprint(signals: &BehavioralSignals) -> Result<String> {
    let serialized = serde_json::to_vec(signals)?;
    let mut hasher = Sha256::new();
    hasher.update(&serialized);
    Ok(hex::encode(hasher.finalize()))
}
