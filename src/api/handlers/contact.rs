//! Contact form handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use super::{ErrorResponse, HandlerError, MessageResponse, row_string, row_u64, store_failure};
use crate::api::AppState;
use crate::db::{Row, SqlValue};

/// Contact message response DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct ContactMessageResponse {
    pub id: u64,
    #[schema(example = "Ana")]
    pub name: String,
    #[schema(example = "ana@example.com")]
    pub email: String,
    pub topic: Option<String>,
    pub message: String,
    pub created_at: Option<String>,
}

impl From<&Row> for ContactMessageResponse {
    fn from(row: &Row) -> Self {
        Self {
            id: row_u64(row, "id"),
            name: row_string(row, "name").unwrap_or_default(),
            email: row_string(row, "email").unwrap_or_default(),
            topic: row_string(row, "topic"),
            message: row_string(row, "message").unwrap_or_default(),
            created_at: row_string(row, "created_at"),
        }
    }
}

/// Contact form submission
#[derive(Debug, Deserialize, ToSchema)]
pub struct ContactRequest {
    #[schema(example = "Ana")]
    pub name: String,
    #[schema(example = "ana@example.com")]
    pub email: String,
    #[schema(example = "Partnership")]
    pub topic: Option<String>,
    pub message: String,
}

/// Submit a contact message
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Message stored", body = MessageResponse),
        (status = 400, description = "Rejected by the store", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req))]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<MessageResponse>, HandlerError> {
    let params = [
        SqlValue::from(req.name),
        SqlValue::from(req.email),
        SqlValue::from(req.topic),
        SqlValue::from(req.message),
    ];
    state
        .relational()
        .query(
            "INSERT INTO contact_messages (name, email, topic, message) VALUES (?, ?, ?, ?)",
            &params,
        )
        .await
        .map_err(store_failure(StatusCode::BAD_REQUEST))?;

    Ok(Json(MessageResponse::with_message("Message received")))
}

/// List contact messages, newest first
#[utoipa::path(
    get,
    path = "/api/contact",
    tag = "contact",
    responses(
        (status = 200, description = "Stored messages", body = Vec<ContactMessageResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_contact_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactMessageResponse>>, HandlerError> {
    let outcome = state
        .relational()
        .query("SELECT * FROM contact_messages ORDER BY created_at DESC", &[])
        .await
        .map_err(store_failure(StatusCode::INTERNAL_SERVER_ERROR))?;

    Ok(Json(
        outcome
            .rows()
            .iter()
            .map(ContactMessageResponse::from)
            .collect(),
    ))
}
