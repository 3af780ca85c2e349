//! Tests for the health endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::{AppState, create_router};
use crate::db::{DocumentConnection, FailoverProxy, Models};

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_fallback_modes() {
    let app = create_router(AppState::new(
        FailoverProxy::emulated(),
        Models::new(DocumentConnection::disconnected()),
    ));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"status": "ok", "relational": "fallback", "document": "fallback"})
    );
}

#[tokio::test]
async fn openapi_docs_are_served() {
    let app = create_router(AppState::new(
        FailoverProxy::emulated(),
        Models::new(DocumentConnection::disconnected()),
    ));

    let response = app
        .oneshot(Request::builder().uri("/docs").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
