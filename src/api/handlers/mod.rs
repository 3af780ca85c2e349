//! HTTP handlers over the relational proxy.
//!
//! Every handler issues its statement through [`crate::db::FailoverProxy`]
//! and shapes the loosely typed rows into response DTOs, so the same JSON
//! comes back whether MySQL or the emulator answered.

mod auth;
mod contact;
mod dashboard;
mod projects;
mod sectors;
mod system;

#[cfg(test)]
mod projects_test;
#[cfg(test)]
mod system_test;

pub use auth::*;
pub use contact::*;
pub use dashboard::*;
pub use projects::*;
pub use sectors::*;
pub use system::*;

use axum::{Json, http::StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::db::{DbError, Row};

// =============================================================================
// Shared DTOs
// =============================================================================

/// Error response DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false
    #[schema(example = false)]
    pub success: bool,
    /// Error message
    #[schema(example = "Project not found")]
    pub message: String,
}

/// Acknowledgment for writes
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = true)]
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Project created")]
    pub message: Option<String>,
    /// Identity assigned by an insert
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl MessageResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            id: None,
        }
    }

    pub fn with_message(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Self::ok()
        }
    }
}

pub type HandlerError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn failure(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.into(),
        }),
    )
}

/// Map a store error to a response, logging it.
pub(crate) fn store_failure(status: StatusCode) -> impl FnOnce(DbError) -> HandlerError {
    move |e| {
        error!(error = %e, "store call failed");
        failure(status, e.to_string())
    }
}

// =============================================================================
// Row helpers
// =============================================================================

/// Public URL of a stored image reference.
///
/// Bare file names live under `/uploads/`; absolute and inline references
/// pass through unchanged.
pub fn normalize_image(image: Option<String>) -> Option<String> {
    image.map(|i| {
        if i.is_empty() || i.starts_with("http") || i.starts_with("data:") {
            i
        } else {
            format!("/uploads/{i}")
        }
    })
}

pub(crate) fn row_u64(row: &Row, column: &str) -> u64 {
    match row.get(column) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_default(),
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        _ => 0,
    }
}

pub(crate) fn row_string(row: &Row, column: &str) -> Option<String> {
    match row.get(column) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Truthiness of a flag column: MySQL may report `TINYINT(1)` as a bool or as `1`.
pub(crate) fn row_flag(row: &Row, column: &str) -> bool {
    match row.get(column) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}
