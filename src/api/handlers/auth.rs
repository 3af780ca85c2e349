//! Administrator login.
//!
//! Verifies credentials only. Issuing a session token is left to the
//! deployment in front of this service.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use super::{ErrorResponse, HandlerError, failure, row_string, row_u64};
use crate::api::AppState;
use crate::db::authenticate_admin;

/// Login request DTO
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    pub password: String,
}

/// Successful login
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = 1)]
    pub id: u64,
}

/// Administrator login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 401, description = "Invalid login", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HandlerError> {
    let admin = authenticate_admin(state.relational(), &req.username, &req.password)
        .await
        .map_err(|e| {
            error!(error = %e, "admin lookup failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
        })?
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Invalid login"))?;

    info!(username = %req.username, "administrator logged in");
    Ok(Json(LoginResponse {
        success: true,
        username: row_string(&admin, "username").unwrap_or(req.username),
        id: row_u64(&admin, "id"),
    }))
}
