//! Recommendation engine orchestration
//!
//! `assign_persona` runs the four extractors, prioritizes the persona
//! matches, and persists the decision trace. `generate_recommendations`
//! builds on that result: eligibility profile, guarded content selection,
//! template rationales, and the optional AI overlay. Consent is verified
//! before any extractor touches data; results are cached read-through with
//! a fixed TTL keyed by operation, user, and parameters.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::AIClient;
use crate::cache::{cache_key, DecisionCache, MemoryCache};
use crate::catalog::{
    select_education, select_offers, ContentCatalog, EducationItem, PartnerOffer, SelectionBounds,
};
use crate::config::EngineConfig;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::guardrails::{
    check_eligibility, estimate_financial_profile, validate_content, ContentFields,
    EligibilityCheck, FinancialProfile,
};
use crate::personas::{
    evaluate_all, DecisionTrace, PersonaDefinition, PersonaId, PersonaPrioritizer, UserContext,
};
use crate::rationale::{generate_rationale, RationaleInput};
use crate::signals::{BehavioralSignals, SignalExtractor};

/// Fixed disclaimer attached to every recommendation payload
pub const DISCLAIMER: &str = "Finch provides educational information, not financial advice. \
    Recommendations are generated from your linked account activity; income and credit \
    figures are behavioral estimates, not bureau data. Partner offers are provided by \
    third parties - review full terms before applying.";

/// JSON-friendly snapshot of a persona definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedPersona {
    pub id: PersonaId,
    pub name: String,
    pub priority: u8,
    pub description: String,
    pub recommendation_types: Vec<String>,
}

impl From<&PersonaDefinition> for AssignedPersona {
    fn from(definition: &PersonaDefinition) -> Self {
        Self {
            id: definition.id,
            name: definition.name.to_string(),
            priority: definition.priority,
            description: definition.description.to_string(),
            recommendation_types: definition
                .recommendation_types
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

/// Result of persona assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaAssignment {
    pub user_id: String,
    pub assigned_persona: AssignedPersona,
    pub rationale: String,
    pub decision_trace: DecisionTrace,
    pub behavioral_signals: BehavioralSignals,
}

/// One recommended education item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationRecommendation {
    pub item: EducationItem,
    pub rationale: String,
    /// Tone-validated AI rephrasing; absent when the overlay is off or failed
    pub augmented_rationale: Option<String>,
}

/// One recommended partner offer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferRecommendation {
    pub item: PartnerOffer,
    pub rationale: String,
    pub augmented_rationale: Option<String>,
    pub eligibility_check: EligibilityCheck,
}

/// Counts surfaced alongside the items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSummary {
    pub education_count: usize,
    pub offer_count: usize,
    pub behaviors_detected: usize,
}

/// Full recommendation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub user_id: String,
    pub persona: AssignedPersona,
    pub education: Vec<EducationRecommendation>,
    pub partner_offers: Vec<OfferRecommendation>,
    pub summary: RecommendationSummary,
    pub financial_profile: FinancialProfile,
    pub decision_trace: DecisionTrace,
    pub disclaimer: String,
    pub generated_at: DateTime<Utc>,
}

/// Tunable knobs for one recommendation call
#[derive(Debug, Clone, Copy)]
pub struct RecommendationOptions {
    pub min_education: usize,
    pub max_education: usize,
    pub max_offers: usize,
    /// Bypass the read-through cache and recompute
    pub force_refresh: bool,
}

impl Default for RecommendationOptions {
    fn default() -> Self {
        Self {
            min_education: 3,
            max_education: 5,
            max_offers: 3,
            force_refresh: false,
        }
    }
}

/// The orchestrator
pub struct RecommendationEngine {
    db: Database,
    catalog: ContentCatalog,
    config: EngineConfig,
    cache: Arc<dyn DecisionCache>,
    ai: Option<AIClient>,
}

impl RecommendationEngine {
    /// Create an engine with the default TTL cache and no AI overlay
    pub fn new(db: Database, catalog: ContentCatalog, config: EngineConfig) -> Self {
        let cache = Arc::new(MemoryCache::new(config.cache_ttl()));
        Self {
            db,
            catalog,
            config,
            cache,
            ai: None,
        }
    }

    /// Substitute the cache collaborator (tests inject a manual clock or noop)
    pub fn with_cache(mut self, cache: Arc<dyn DecisionCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Attach the optional AI rationale overlay
    pub fn with_ai(mut self, ai: AIClient) -> Self {
        self.ai = Some(ai);
        self
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Verify consent before anything touches the user's data.
    ///
    /// A missing user or missing consent aborts the call with no partial
    /// output; neither error is retried here.
    fn verify_consent(&self, user_id: &str) -> Result<crate::models::User> {
        let user = self.db.get_user(user_id)?;
        if !user.consent_granted {
            return Err(Error::ConsentRequired(user_id.to_string()));
        }
        Ok(user)
    }

    /// Assign exactly one persona to the user
    pub fn assign_persona(&self, user_id: &str, force_refresh: bool) -> Result<PersonaAssignment> {
        let user = self.verify_consent(user_id)?;

        let key = cache_key("assign_persona", user_id, "");
        if !force_refresh {
            if let Some(cached) = self.cache.get(&key) {
                debug!(user_id, "Persona assignment served from cache");
                return Ok(serde_json::from_str(&cached)?);
            }
        }

        let as_of = Utc::now().date_naive();
        let extractor = SignalExtractor::new(&self.db, &self.config);
        let signals = extractor.extract_all(user_id, as_of)?;

        let accounts = self.db.list_accounts(user_id)?;
        let ctx = UserContext {
            user_created_at: user.created_at,
            as_of,
            account_count: accounts.len(),
            card_limits: accounts
                .iter()
                .filter(|a| a.is_credit_card())
                .filter_map(|a| a.credit_limit)
                .collect(),
        };

        let matches = evaluate_all(&signals, &ctx, &self.config);
        let selection = PersonaPrioritizer::select(&matches);
        let trace = PersonaPrioritizer::build_trace(matches, &selection, &signals)?;

        // Persist to the operator review queue before returning
        let trace_payload = serde_json::to_value(&trace)?;
        self.db.insert_trace(
            user_id,
            selection.persona.as_str(),
            &selection.selection_reason,
            &trace_payload,
        )?;

        let assignment = PersonaAssignment {
            user_id: user_id.to_string(),
            assigned_persona: AssignedPersona::from(selection.persona.definition()),
            rationale: selection.rationale,
            decision_trace: trace,
            behavioral_signals: signals,
        };

        info!(
            user_id,
            persona = %assignment.assigned_persona.id,
            matches = assignment.decision_trace.all_matches.len(),
            "Persona assigned"
        );

        self.cache.set(&key, serde_json::to_string(&assignment)?);
        Ok(assignment)
    }

    /// Generate the full recommendation payload for a user
    pub async fn generate_recommendations(
        &self,
        user_id: &str,
        options: RecommendationOptions,
    ) -> Result<RecommendationSet> {
        // Consent gates the cached path too
        self.verify_consent(user_id)?;

        let params = format!(
            "{}:{}:{}",
            options.min_education, options.max_education, options.max_offers
        );
        let key = cache_key("recommendations", user_id, &params);
        if !options.force_refresh {
            if let Some(cached) = self.cache.get(&key) {
                debug!(user_id, "Recommendations served from cache");
                return Ok(serde_json::from_str(&cached)?);
            }
        }

        let assignment = self.assign_persona(user_id, options.force_refresh)?;
        let persona = assignment.assigned_persona.id.definition();
        let signals = &assignment.behavioral_signals;

        let profile = estimate_financial_profile(signals);
        let accounts = self.db.list_accounts(user_id)?;

        // Education selection
        let education_bounds = SelectionBounds {
            min_items: options.min_education,
            max_items: options.max_education,
        };
        let education_items = select_education(self.catalog.education(), persona, education_bounds);

        // Offer selection, eligibility-gated; checks are memoized so the
        // surfaced result carries the same evaluation that admitted it
        let mut checks: std::collections::HashMap<String, EligibilityCheck> =
            std::collections::HashMap::new();
        let offer_bounds = SelectionBounds {
            min_items: 0,
            max_items: options.max_offers,
        };
        let offer_items = select_offers(self.catalog.offers(), persona, offer_bounds, |offer| {
            let check = checks
                .entry(offer.id.clone())
                .or_insert_with(|| check_eligibility(offer, &profile, &accounts));
            check.is_eligible
        });

        let mut education = Vec::with_capacity(education_items.len());
        for item in education_items {
            let rationale = generate_rationale(
                &RationaleInput {
                    recommendation_types: &item.recommendation_types,
                    offer_category: None,
                },
                persona,
                signals,
            );
            let augmented_rationale = self.augment(persona.name, &item.title, &rationale).await;
            education.push(EducationRecommendation {
                item: item.clone(),
                rationale,
                augmented_rationale,
            });
        }

        let mut partner_offers = Vec::with_capacity(offer_items.len());
        for offer in offer_items {
            let rationale = generate_rationale(
                &RationaleInput {
                    recommendation_types: &offer.recommendation_types,
                    offer_category: Some(&offer.offer_category),
                },
                persona,
                signals,
            );
            let augmented_rationale = self.augment(persona.name, &offer.title, &rationale).await;
            let eligibility_check = checks
                .remove(&offer.id)
                .unwrap_or_else(|| check_eligibility(offer, &profile, &accounts));
            partner_offers.push(OfferRecommendation {
                item: offer.clone(),
                rationale,
                augmented_rationale,
                eligibility_check,
            });
        }

        let set = RecommendationSet {
            user_id: user_id.to_string(),
            persona: assignment.assigned_persona.clone(),
            summary: RecommendationSummary {
                education_count: education.len(),
                offer_count: partner_offers.len(),
                behaviors_detected: signals.detected_domain_count(),
            },
            education,
            partner_offers,
            financial_profile: profile,
            decision_trace: assignment.decision_trace.clone(),
            disclaimer: DISCLAIMER.to_string(),
            generated_at: Utc::now(),
        };

        info!(
            user_id,
            persona = %set.persona.id,
            education = set.summary.education_count,
            offers = set.summary.offer_count,
            "Recommendations generated"
        );

        self.cache.set(&key, serde_json::to_string(&set)?);
        Ok(set)
    }

    /// Best-effort AI rephrasing of a template rationale.
    ///
    /// Failures, timeouts, and tone violations all degrade to `None`; the
    /// template path is never blocked and nothing is retried.
    async fn augment(
        &self,
        persona_name: &str,
        item_title: &str,
        template_rationale: &str,
    ) -> Option<String> {
        let ai = self.ai.as_ref()?;

        let attempt = tokio::time::timeout(
            self.config.augmentation.timeout(),
            ai.augment_rationale(persona_name, item_title, template_rationale),
        )
        .await;

        let text = match attempt {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                debug!(error = %e, item_title, "Rationale augmentation failed");
                return None;
            }
            Err(_) => {
                debug!(item_title, "Rationale augmentation timed out");
                return None;
            }
        };

        let report = validate_content(&ContentFields {
            rationale: Some(&text),
            ..Default::default()
        });
        if !report.is_valid {
            warn!(
                item_title,
                violations = report.violations.len(),
                "Discarded augmented rationale after tone violation"
            );
            return None;
        }

        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::cache::NoopCache;
    use crate::seed;

    fn engine() -> RecommendationEngine {
        let db = Database::in_memory().unwrap();
        RecommendationEngine::new(
            db,
            ContentCatalog::builtin().unwrap(),
            EngineConfig::default(),
        )
    }

    #[test]
    fn test_missing_user_surfaces_not_found() {
        let engine = engine();
        match engine.assign_persona("ghost", false) {
            Err(Error::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other.map(|a| a.user_id)),
        }
    }

    #[test]
    fn test_consent_blocks_before_extraction() {
        let engine = engine();
        engine.db.upsert_user("u-noconsent", "Quinn", false).unwrap();

        match engine.assign_persona("u-noconsent", false) {
            Err(Error::ConsentRequired(user)) => assert_eq!(user, "u-noconsent"),
            other => panic!("expected ConsentRequired, got {:?}", other.map(|a| a.user_id)),
        }
        // Nothing was persisted to the review queue
        assert_eq!(engine.db.count_traces_for_user("u-noconsent").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failing_ai_degrades_to_template_only() {
        let db = Database::in_memory().unwrap();
        seed::seed_demo_users(&db, Utc::now().date_naive()).unwrap();

        let engine = RecommendationEngine::new(
            db,
            ContentCatalog::builtin().unwrap(),
            EngineConfig::default(),
        )
        .with_cache(Arc::new(NoopCache))
        .with_ai(AIClient::Mock(MockBackend::failing()));

        let set = engine
            .generate_recommendations(seed::HIGH_UTILIZATION_USER, RecommendationOptions::default())
            .await
            .unwrap();

        assert!(!set.education.is_empty());
        for rec in &set.education {
            assert!(!rec.rationale.is_empty());
            assert!(rec.augmented_rationale.is_none());
        }
    }

    #[tokio::test]
    async fn test_tone_violating_ai_output_is_discarded() {
        let db = Database::in_memory().unwrap();
        seed::seed_demo_users(&db, Utc::now().date_naive()).unwrap();

        let engine = RecommendationEngine::new(
            db,
            ContentCatalog::builtin().unwrap(),
            EngineConfig::default(),
        )
        .with_cache(Arc::new(NoopCache))
        .with_ai(AIClient::Mock(MockBackend::tone_violating()));

        let set = engine
            .generate_recommendations(seed::SUBSCRIPTION_HEAVY_USER, RecommendationOptions::default())
            .await
            .unwrap();

        for rec in &set.education {
            assert!(rec.augmented_rationale.is_none());
        }
    }

    #[tokio::test]
    async fn test_friendly_ai_output_is_attached() {
        let db = Database::in_memory().unwrap();
        seed::seed_demo_users(&db, Utc::now().date_naive()).unwrap();

        let engine = RecommendationEngine::new(
            db,
            ContentCatalog::builtin().unwrap(),
            EngineConfig::default(),
        )
        .with_cache(Arc::new(NoopCache))
        .with_ai(AIClient::Mock(MockBackend::new()));

        let set = engine
            .generate_recommendations(seed::SAVINGS_BUILDER_USER, RecommendationOptions::default())
            .await
            .unwrap();

        assert!(set
            .education
            .iter()
            .all(|rec| rec.augmented_rationale.is_some()));
    }
}
