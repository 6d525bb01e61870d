//! Evaluation report
//!
//! Runs the full pipeline for every stored user and scores the output
//! against the demo's fixed targets: coverage 100%, explainability 100%,
//! latency under 5 seconds per call, auditability 100%.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::engine::{RecommendationEngine, RecommendationOptions};
use crate::error::Result;

/// Latency target per recommendation call, in milliseconds
pub const LATENCY_TARGET_MS: u128 = 5_000;
/// Domains with evidence required for a user to count as "covered"
pub const COVERAGE_MIN_BEHAVIORS: usize = 3;

/// Per-user evaluation row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEvaluation {
    pub user_id: String,
    pub persona: String,
    pub behaviors_detected: usize,
    pub recommendation_count: usize,
    pub rationales_present: usize,
    pub has_decision_trace: bool,
    pub latency_ms: u128,
}

/// Aggregate evaluation metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub users_evaluated: usize,
    /// Share of users with a persona and at least three detected behaviors
    pub coverage_pct: f64,
    /// Share of recommendations carrying a non-empty rationale
    pub explainability_pct: f64,
    /// Share of recommendation sets with an attached decision trace
    pub auditability_pct: f64,
    pub max_latency_ms: u128,
    pub avg_latency_ms: u128,
    pub latency_target_met: bool,
    pub rows: Vec<UserEvaluation>,
}

/// Evaluate every stored user
///
/// Uses `force_refresh` so latency reflects full computation, not cache hits.
pub async fn run_evaluation(engine: &RecommendationEngine) -> Result<EvaluationReport> {
    let users = engine.db().list_users()?;

    let mut rows = Vec::with_capacity(users.len());
    let mut total_recommendations = 0usize;
    let mut total_rationales = 0usize;

    for user in &users {
        let started = Instant::now();
        let set = engine
            .generate_recommendations(
                &user.user_id,
                RecommendationOptions {
                    force_refresh: true,
                    ..Default::default()
                },
            )
            .await?;
        let latency_ms = started.elapsed().as_millis();

        let recommendation_count = set.education.len() + set.partner_offers.len();
        let rationales_present = set
            .education
            .iter()
            .map(|r| r.rationale.trim())
            .chain(set.partner_offers.iter().map(|r| r.rationale.trim()))
            .filter(|r| !r.is_empty())
            .count();

        total_recommendations += recommendation_count;
        total_rationales += rationales_present;

        rows.push(UserEvaluation {
            user_id: user.user_id.clone(),
            persona: set.persona.id.to_string(),
            behaviors_detected: set.summary.behaviors_detected,
            recommendation_count,
            rationales_present,
            has_decision_trace: !set.decision_trace.signal_fingerprint.is_empty(),
            latency_ms,
        });
    }

    let users_evaluated = rows.len();
    let pct = |num: usize, den: usize| {
        if den == 0 {
            100.0
        } else {
            num as f64 / den as f64 * 100.0
        }
    };

    let covered = rows
        .iter()
        .filter(|row| row.behaviors_detected >= COVERAGE_MIN_BEHAVIORS)
        .count();
    let audited = rows.iter().filter(|row| row.has_decision_trace).count();
    let max_latency_ms = rows.iter().map(|row| row.latency_ms).max().unwrap_or(0);
    let avg_latency_ms = if users_evaluated > 0 {
        rows.iter().map(|row| row.latency_ms).sum::<u128>() / users_evaluated as u128
    } else {
        0
    };

    Ok(EvaluationReport {
        users_evaluated,
        coverage_pct: pct(covered, users_evaluated),
        explainability_pct: pct(total_rationales, total_recommendations),
        auditability_pct: pct(audited, users_evaluated),
        max_latency_ms,
        avg_latency_ms,
        latency_target_met: max_latency_ms < LATENCY_TARGET_MS,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ContentCatalog;
    use crate::config::EngineConfig;
    use crate::db::Database;
    use crate::seed;
    use chrono::Utc;

    #[tokio::test]
    async fn test_evaluation_over_seeded_users() {
        let db = Database::in_memory().unwrap();
        seed::seed_demo_users(&db, Utc::now().date_naive()).unwrap();
        let engine = RecommendationEngine::new(
            db,
            ContentCatalog::builtin().unwrap(),
            EngineConfig::default(),
        );

        let report = run_evaluation(&engine).await.unwrap();
        assert_eq!(report.users_evaluated, 5);
        assert_eq!(report.explainability_pct, 100.0);
        assert_eq!(report.auditability_pct, 100.0);
        assert!(report.latency_target_met);
        // The brand-new user has under three behaviors; everyone else covers
        assert!(report.coverage_pct >= 60.0);
    }
}
