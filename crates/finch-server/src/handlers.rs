//! API route handlers

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use finch_core::{
    engine::{PersonaAssignment, RecommendationOptions, RecommendationSet},
    models::{ReviewStatus, StoredTrace, User},
    personas::PERSONAS,
    report::{run_evaluation, EvaluationReport},
};

use crate::{ApiError, AppState, MAX_TRACE_LIMIT};

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.engine.db().list_users()?))
}

#[derive(Serialize)]
pub struct PersonaInfo {
    pub id: String,
    pub name: &'static str,
    pub priority: u8,
    pub description: &'static str,
    pub recommendation_types: &'static [&'static str],
}

pub async fn list_personas() -> Json<Vec<PersonaInfo>> {
    let personas = PERSONAS
        .iter()
        .map(|p| PersonaInfo {
            id: p.id.to_string(),
            name: p.name,
            priority: p.priority,
            description: p.description,
            recommendation_types: p.recommendation_types,
        })
        .collect();
    Json(personas)
}

#[derive(Deserialize, Default)]
pub struct RefreshParams {
    #[serde(default)]
    pub force_refresh: bool,
}

pub async fn assign_persona(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<RefreshParams>,
) -> Result<Json<PersonaAssignment>, ApiError> {
    let assignment = state.engine.assign_persona(&user_id, params.force_refresh)?;
    Ok(Json(assignment))
}

#[derive(Deserialize, Default)]
pub struct RecommendationParams {
    #[serde(default)]
    pub force_refresh: bool,
    pub min_education: Option<usize>,
    pub max_education: Option<usize>,
    pub max_offers: Option<usize>,
}

pub async fn generate_recommendations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(params): Json<RecommendationParams>,
) -> Result<Json<RecommendationSet>, ApiError> {
    let defaults = RecommendationOptions::default();
    let options = RecommendationOptions {
        min_education: params.min_education.unwrap_or(defaults.min_education),
        max_education: params.max_education.unwrap_or(defaults.max_education),
        max_offers: params.max_offers.unwrap_or(defaults.max_offers),
        force_refresh: params.force_refresh,
    };
    if options.min_education > options.max_education {
        return Err(ApiError::bad_request(
            "min_education cannot exceed max_education",
        ));
    }

    let set = state
        .engine
        .generate_recommendations(&user_id, options)
        .await?;
    Ok(Json(set))
}

#[derive(Deserialize, Default)]
pub struct TraceParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_traces(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TraceParams>,
) -> Result<Json<Vec<StoredTrace>>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(ReviewStatus::from_str)
        .transpose()
        .map_err(ApiError::bad_request)?;
    let limit = params.limit.unwrap_or(50).clamp(1, MAX_TRACE_LIMIT);
    Ok(Json(state.engine.db().list_traces(status, limit)?))
}

#[derive(Deserialize)]
pub struct ReviewRequest {
    pub status: String,
    pub note: Option<String>,
}

#[derive(Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub status: String,
}

pub async fn review_trace(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let status = ReviewStatus::from_str(&request.status).map_err(ApiError::bad_request)?;
    state
        .engine
        .db()
        .resolve_trace(id, status, request.note.as_deref())?;
    Ok(Json(ReviewResponse {
        id,
        status: status.to_string(),
    }))
}

pub async fn evaluation_report(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EvaluationReport>, ApiError> {
    Ok(Json(run_evaluation(&state.engine).await?))
}
