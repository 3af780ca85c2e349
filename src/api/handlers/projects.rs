//! Project management handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use super::{
    ErrorResponse, HandlerError, MessageResponse, failure, normalize_image, row_string, row_u64,
    store_failure,
};
use crate::api::AppState;
use crate::db::{Row, SqlValue};

// =============================================================================
// DTOs (Data Transfer Objects)
// =============================================================================

/// Project response DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Harbour Bridge")]
    pub title: String,
    #[schema(example = "infrastructure")]
    pub category: Option<String>,
    pub description: Option<String>,
    /// Public image URL
    #[schema(example = "/uploads/demo.jpg")]
    pub image: Option<String>,
    #[schema(example = "2025-01-01 00:00:00")]
    pub created_at: Option<String>,
}

impl From<&Row> for ProjectResponse {
    fn from(row: &Row) -> Self {
        Self {
            id: row_u64(row, "id"),
            title: row_string(row, "title").unwrap_or_default(),
            category: row_string(row, "category"),
            description: row_string(row, "description"),
            image: normalize_image(row_string(row, "image")),
            created_at: row_string(row, "created_at"),
        }
    }
}

/// Single project envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectDetailResponse {
    pub success: bool,
    pub data: ProjectResponse,
}

/// Create or update project request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProjectRequest {
    #[schema(example = "Harbour Bridge")]
    pub title: String,
    #[schema(example = "infrastructure")]
    pub category: Option<String>,
    pub description: Option<String>,
    /// Stored image reference; on update, omitted keeps the current one
    #[schema(example = "demo.jpg")]
    pub image: Option<String>,
}

async fn fetch_project(state: &AppState, id: &str) -> Result<Row, HandlerError> {
    let outcome = state
        .relational()
        .query("SELECT * FROM projects WHERE id = ?", &[SqlValue::from(id)])
        .await
        .map_err(store_failure(StatusCode::NOT_FOUND))?;

    outcome
        .into_rows()
        .into_iter()
        .next()
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Project not found"))
}

// =============================================================================
// Handlers
// =============================================================================

/// List all projects
///
/// Newest first, with image references resolved to public URLs
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    responses(
        (status = 200, description = "List of projects", body = Vec<ProjectResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, HandlerError> {
    let outcome = state
        .relational()
        .query("SELECT * FROM projects ORDER BY created_at DESC", &[])
        .await
        .map_err(store_failure(StatusCode::INTERNAL_SERVER_ERROR))?;

    Ok(Json(outcome.rows().iter().map(ProjectResponse::from).collect()))
}

/// Get a project by ID
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "projects",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project found", body = ProjectDetailResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectDetailResponse>, HandlerError> {
    let row = fetch_project(&state, &id).await?;
    Ok(Json(ProjectDetailResponse {
        success: true,
        data: ProjectResponse::from(&row),
    }))
}

/// Create a new project
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "projects",
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Project created", body = MessageResponse),
        (status = 400, description = "Rejected by the store", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_project(
    State(state): State<AppState>,
    Json(req): Json<ProjectRequest>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let params = [
        SqlValue::from(req.title),
        SqlValue::from(req.category),
        SqlValue::from(req.description),
        SqlValue::from(req.image),
    ];
    let outcome = state
        .relational()
        .query(
            "INSERT INTO projects (title, category, description, image) VALUES (?, ?, ?, ?)",
            &params,
        )
        .await
        .map_err(store_failure(StatusCode::BAD_REQUEST))?;

    Ok(Json(MessageResponse {
        id: outcome.ack().map(|ack| ack.insert_id),
        ..MessageResponse::with_message("Project created")
    }))
}

/// Update a project
///
/// The current image is kept unless the request names a new one
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "projects",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = MessageResponse),
        (status = 400, description = "Rejected by the store", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ProjectRequest>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let current = fetch_project(&state, &id).await?;
    let image = req.image.or_else(|| row_string(&current, "image"));

    let params = [
        SqlValue::from(req.title),
        SqlValue::from(req.category),
        SqlValue::from(req.description),
        SqlValue::from(image),
        SqlValue::from(id),
    ];
    state
        .relational()
        .query(
            "UPDATE projects SET title = ?, category = ?, description = ?, image = ? WHERE id = ?",
            &params,
        )
        .await
        .map_err(store_failure(StatusCode::BAD_REQUEST))?;

    Ok(Json(MessageResponse::with_message(
        "Project updated successfully",
    )))
}

/// Delete a project
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "projects",
    params(
        ("id" = String, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project deleted", body = MessageResponse),
        (status = 400, description = "Rejected by the store", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, HandlerError> {
    state
        .relational()
        .query("DELETE FROM projects WHERE id = ?", &[SqlValue::from(id)])
        .await
        .map_err(store_failure(StatusCode::BAD_REQUEST))?;

    Ok(Json(MessageResponse::ok()))
}
