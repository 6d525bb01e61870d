//! Finch Web Server
//!
//! Axum-based REST API over the recommendation engine:
//! - persona assignment and recommendation generation per user
//! - the operator review queue for persisted decision traces
//! - the evaluation report
//!
//! Error responses are sanitized: core errors map to status codes with a
//! short message, never internal detail.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use finch_core::engine::RecommendationEngine;

mod handlers;

/// Maximum traces returned by one queue listing
pub const MAX_TRACE_LIMIT: i64 = 500;

/// Shared application state
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
}

/// API error with a sanitized message
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<finch_core::Error> for ApiError {
    fn from(err: finch_core::Error) -> Self {
        use finch_core::Error;
        let (status, message) = match &err {
            Error::ConsentRequired(_) => (StatusCode::FORBIDDEN, err.to_string()),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
            Error::InvalidData(_) | Error::Config(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            _ => {
                // Internal detail stays in the logs
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        Self { status, message }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/users", get(handlers::list_users))
        .route("/api/personas", get(handlers::list_personas))
        .route("/api/users/:user_id/persona", post(handlers::assign_persona))
        .route(
            "/api/users/:user_id/recommendations",
            post(handlers::generate_recommendations),
        )
        .route("/api/traces", get(handlers::list_traces))
        .route("/api/traces/:id/review", post(handlers::review_trace))
        .route("/api/report", get(handlers::evaluation_report))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until shutdown
pub async fn serve(engine: Arc<RecommendationEngine>, host: &str, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(AppState { engine });
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr, "Finch API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests;
