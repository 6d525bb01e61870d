//! Finch Core Library
//!
//! Shared functionality for the Finch financial-wellness tool:
//! - Database access and migrations
//! - Behavioral signal extraction over two lookback windows
//! - Persona catalog, matching, and priority-based selection
//! - Education and partner-offer catalogs with scored selection
//! - Eligibility and tone guardrails
//! - Template rationale generation
//! - Pluggable local AI rationale augmentation (Ollama, mock)
//! - Read-through TTL result cache
//! - Synthetic demo data and the evaluation report

pub mod ai;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod guardrails;
pub mod models;
pub mod personas;
pub mod rationale;
pub mod report;
pub mod seed;
pub mod signals;

pub use ai::{AIClient, MockBackend, OllamaBackend, RationaleBackend};
pub use cache::{Clock, DecisionCache, ManualClock, MemoryCache, NoopCache, SystemClock};
pub use catalog::{ContentCatalog, EducationItem, OfferEligibility, PartnerOffer, SelectionBounds};
pub use config::EngineConfig;
pub use db::Database;
pub use engine::{
    PersonaAssignment, RecommendationEngine, RecommendationOptions, RecommendationSet, DISCLAIMER,
};
pub use error::{Error, Result};
pub use guardrails::{EligibilityCheck, FinancialProfile, ToneReport};
pub use personas::{DecisionTrace, MatchResult, PersonaId, UserContext, PERSONAS};
pub use report::{run_evaluation, EvaluationReport};
pub use signals::{BehavioralSignals, SignalExtractor, Window, Windowed};
