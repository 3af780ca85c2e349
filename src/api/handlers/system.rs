//! System health and status handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::AppState;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    #[schema(example = "ok")]
    pub status: String,
    /// Relational delegate bound at startup
    #[schema(example = "live")]
    pub relational: String,
    /// Document delegate the next call would use
    #[schema(example = "fallback")]
    pub document: String,
}

/// Health check endpoint
///
/// Returns the service status and which delegate serves each store
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Health check successful", body = HealthResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        relational: state.relational().mode().to_string(),
        document: state.models().mode().to_string(),
    })
}
