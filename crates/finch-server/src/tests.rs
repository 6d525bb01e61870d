//! Server integration tests using in-process requests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use finch_core::{
    catalog::ContentCatalog, config::EngineConfig, db::Database, engine::RecommendationEngine,
    seed,
};

use crate::{router, AppState};

fn test_router() -> axum::Router {
    let db = Database::in_memory().unwrap();
    seed::seed_demo_users(&db, chrono::Utc::now().date_naive()).unwrap();
    let engine = RecommendationEngine::new(
        db,
        ContentCatalog::builtin().unwrap(),
        EngineConfig::default(),
    );
    router(Arc::new(AppState {
        engine: Arc::new(engine),
    }))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = test_router();
    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_list_personas_returns_all_five() {
    let app = test_router();
    let response = app
        .oneshot(Request::get("/api/personas").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_assign_persona_endpoint() {
    let app = test_router();
    let uri = format!("/api/users/{}/persona", seed::HIGH_UTILIZATION_USER);
    let response = app
        .oneshot(Request::post(uri.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["assigned_persona"]["id"], "high_utilization");
    assert!(body["decision_trace"]["all_matches"].is_array());
    assert!(body["rationale"].as_str().unwrap().contains("9321"));
}

#[tokio::test]
async fn test_unknown_user_is_404() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::post("/api/users/ghost/persona")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_consent_revoked_is_403() {
    let db = Database::in_memory().unwrap();
    seed::seed_demo_users(&db, chrono::Utc::now().date_naive()).unwrap();
    db.set_consent(seed::NEW_USER, false).unwrap();
    let engine = RecommendationEngine::new(
        db,
        ContentCatalog::builtin().unwrap(),
        EngineConfig::default(),
    );
    let app = router(Arc::new(AppState {
        engine: Arc::new(engine),
    }));

    let uri = format!("/api/users/{}/persona", seed::NEW_USER);
    let response = app
        .oneshot(Request::post(uri.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_recommendations_endpoint_bounds() {
    let app = test_router();
    let uri = format!(
        "/api/users/{}/recommendations",
        seed::SUBSCRIPTION_HEAVY_USER
    );
    let response = app
        .oneshot(
            Request::post(uri.as_str())
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let education = body["education"].as_array().unwrap();
    assert!((3..=5).contains(&education.len()));
    let offers = body["partner_offers"].as_array().unwrap();
    assert!(offers.len() <= 3);
    assert!(!body["disclaimer"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_bounds_are_400() {
    let app = test_router();
    let uri = format!("/api/users/{}/recommendations", seed::NEW_USER);
    let response = app
        .oneshot(
            Request::post(uri.as_str())
                .header("content-type", "application/json")
                .body(Body::from(r#"{"min_education": 6, "max_education": 3}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trace_review_flow() {
    let app = test_router();

    // Assign to create a pending trace
    let uri = format!("/api/users/{}/persona", seed::NEW_USER);
    let response = app
        .clone()
        .oneshot(Request::post(uri.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/traces?status=pending")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let traces = body_json(response).await;
    let trace_id = traces[0]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/traces/{}/review", trace_id))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"status": "approved", "note": "ok"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::get("/api/traces?status=pending")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let remaining = body_json(response).await;
    assert!(remaining.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_review_status_is_400() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::post("/api/traces/1/review")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"status": "maybe"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
