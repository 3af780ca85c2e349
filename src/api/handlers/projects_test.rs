//! Integration tests for Project API endpoints against the relational emulator.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::{AppState, create_router};
use crate::db::{DocumentConnection, FailoverProxy, Models};

/// Create a test app bound to the emulator
fn test_app() -> axum::Router {
    let state = AppState::new(
        FailoverProxy::emulated(),
        Models::new(DocumentConnection::disconnected()),
    );
    create_router(state)
}

/// Helper to parse JSON response body
async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

// =============================================================================
// GET /api/projects - List Projects
// =============================================================================

#[tokio::test]
async fn list_projects_returns_emulated_row_with_public_image() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/projects")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let projects = body.as_array().expect("Expected array");
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["id"], 1);
    assert_eq!(projects[0]["title"], "MySQL Demo Project");
    assert_eq!(projects[0]["image"], "/uploads/demo.jpg");
}

// =============================================================================
// GET /api/projects/{id} - Get Project
// =============================================================================

#[tokio::test]
async fn get_project_wraps_row_in_envelope() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/projects/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["category"], "infrastructure");
}

// =============================================================================
// POST /api/projects - Create Project
// =============================================================================

#[tokio::test]
async fn create_project_acknowledges_with_identity() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/projects",
            json!({
                "title": "New Project",
                "category": "energy",
                "description": "A test project"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Project created");
    assert!(body["id"].as_u64().is_some());
}

#[tokio::test]
async fn create_project_rejects_missing_title() {
    let app = test_app();

    let response = app
        .oneshot(json_request("POST", "/api/projects", json!({"category": "x"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn created_project_is_not_listed_in_fallback() {
    let app = test_app();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/projects",
            json!({"title": "Ephemeral", "category": "x"}),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/projects")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = json_body(response).await;
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].clone())
        .collect();
    assert!(!titles.contains(&json!("Ephemeral")));
}

// =============================================================================
// PUT / DELETE /api/projects/{id}
// =============================================================================

#[tokio::test]
async fn update_project_reports_success() {
    let app = test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/projects/1",
            json!({"title": "Renamed", "category": "infrastructure"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Project updated successfully");
}

#[tokio::test]
async fn delete_project_reports_success() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/projects/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"success": true}));
}
