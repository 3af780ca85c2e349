//! Sector management handlers.
//!
//! The table stores visibility as `is_active`; responses also carry it as
//! `isVisible` for the site's front end.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use utoipa::ToSchema;

use super::{
    ErrorResponse, HandlerError, MessageResponse, failure, normalize_image, row_flag, row_string,
    row_u64, store_failure,
};
use crate::api::AppState;
use crate::db::{Row, SqlValue};

/// Sector response DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct SectorResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Aviation")]
    pub title: String,
    #[schema(example = "aviation")]
    pub category: Option<String>,
    pub description: Option<String>,
    #[schema(example = "/uploads/demo.jpg")]
    pub image: Option<String>,
    pub is_active: bool,
    #[serde(rename = "isVisible")]
    pub is_visible: bool,
    #[schema(example = "2025-01-01 00:00:00")]
    pub created_at: Option<String>,
}

impl From<&Row> for SectorResponse {
    fn from(row: &Row) -> Self {
        let active = row_flag(row, "is_active");
        Self {
            id: row_u64(row, "id"),
            title: row_string(row, "title").unwrap_or_default(),
            category: row_string(row, "category"),
            description: row_string(row, "description"),
            image: normalize_image(row_string(row, "image")),
            is_active: active,
            is_visible: active,
            created_at: row_string(row, "created_at"),
        }
    }
}

/// Single sector envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct SectorDetailResponse {
    pub success: bool,
    pub data: SectorResponse,
}

/// Create sector request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSectorRequest {
    #[schema(example = "Aviation")]
    pub title: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Update sector request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSectorRequest {
    #[schema(example = "Aviation")]
    pub title: String,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Omitted keeps the current image
    pub image: Option<String>,
    /// `true`, `"true"` or `1` show the sector; omitted keeps the current state
    #[serde(rename = "isVisible")]
    #[schema(value_type = Option<bool>)]
    pub is_visible: Option<Value>,
}

/// Interpret a loosely typed visibility toggle.
pub fn visibility_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        Value::Number(n) => n.as_i64() == Some(1),
        _ => false,
    }
}

async fn fetch_sector(state: &AppState, id: &str) -> Result<Row, HandlerError> {
    let outcome = state
        .relational()
        .query("SELECT * FROM sectors WHERE id = ?", &[SqlValue::from(id)])
        .await
        .map_err(store_failure(StatusCode::NOT_FOUND))?;

    outcome
        .into_rows()
        .into_iter()
        .next()
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Sector not found"))
}

/// List all sectors
#[utoipa::path(
    get,
    path = "/api/sectors",
    tag = "sectors",
    responses(
        (status = 200, description = "List of sectors", body = Vec<SectorResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_sectors(
    State(state): State<AppState>,
) -> Result<Json<Vec<SectorResponse>>, HandlerError> {
    let outcome = state
        .relational()
        .query("SELECT * FROM sectors", &[])
        .await
        .map_err(store_failure(StatusCode::INTERNAL_SERVER_ERROR))?;

    Ok(Json(outcome.rows().iter().map(SectorResponse::from).collect()))
}

/// Get a sector by ID
#[utoipa::path(
    get,
    path = "/api/sectors/{id}",
    tag = "sectors",
    params(
        ("id" = String, Path, description = "Sector ID")
    ),
    responses(
        (status = 200, description = "Sector found", body = SectorDetailResponse),
        (status = 404, description = "Sector not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_sector(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SectorDetailResponse>, HandlerError> {
    let row = fetch_sector(&state, &id).await?;
    Ok(Json(SectorDetailResponse {
        success: true,
        data: SectorResponse::from(&row),
    }))
}

/// Create a new sector
///
/// New sectors start visible
#[utoipa::path(
    post,
    path = "/api/sectors",
    tag = "sectors",
    request_body = CreateSectorRequest,
    responses(
        (status = 200, description = "Sector created", body = MessageResponse),
        (status = 400, description = "Rejected by the store", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_sector(
    State(state): State<AppState>,
    Json(req): Json<CreateSectorRequest>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let params = [
        SqlValue::from(req.title),
        SqlValue::from(req.category),
        SqlValue::from(req.description),
        SqlValue::from(req.image),
        SqlValue::from(true),
    ];
    let outcome = state
        .relational()
        .query(
            "INSERT INTO sectors (title, category, description, image, is_active) VALUES (?, ?, ?, ?, ?)",
            &params,
        )
        .await
        .map_err(store_failure(StatusCode::BAD_REQUEST))?;

    Ok(Json(MessageResponse {
        id: outcome.ack().map(|ack| ack.insert_id),
        ..MessageResponse::ok()
    }))
}

/// Update a sector
#[utoipa::path(
    put,
    path = "/api/sectors/{id}",
    tag = "sectors",
    params(
        ("id" = String, Path, description = "Sector ID")
    ),
    request_body = UpdateSectorRequest,
    responses(
        (status = 200, description = "Sector updated", body = MessageResponse),
        (status = 400, description = "Rejected by the store", body = ErrorResponse),
        (status = 404, description = "Sector not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_sector(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSectorRequest>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let current = fetch_sector(&state, &id).await?;
    let image = req.image.or_else(|| row_string(&current, "image"));
    let is_active = match &req.is_visible {
        Some(flag) => visibility_flag(flag),
        None => row_flag(&current, "is_active"),
    };

    let params = [
        SqlValue::from(req.title),
        SqlValue::from(req.category),
        SqlValue::from(req.description),
        SqlValue::from(image),
        SqlValue::from(is_active),
        SqlValue::from(id),
    ];
    state
        .relational()
        .query(
            "UPDATE sectors SET title = ?, category = ?, description = ?, image = ?, is_active = ? WHERE id = ?",
            &params,
        )
        .await
        .map_err(store_failure(StatusCode::BAD_REQUEST))?;

    Ok(Json(MessageResponse::with_message(
        "Sector updated successfully",
    )))
}

/// Delete a sector
#[utoipa::path(
    delete,
    path = "/api/sectors/{id}",
    tag = "sectors",
    params(
        ("id" = String, Path, description = "Sector ID")
    ),
    responses(
        (status = 200, description = "Sector deleted", body = MessageResponse),
        (status = 400, description = "Rejected by the store", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_sector(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, HandlerError> {
    state
        .relational()
        .query("DELETE FROM sectors WHERE id = ?", &[SqlValue::from(id)])
        .await
        .map_err(store_failure(StatusCode::BAD_REQUEST))?;

    Ok(Json(MessageResponse::ok()))
}
