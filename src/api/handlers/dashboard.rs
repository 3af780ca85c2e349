//! Admin dashboard statistics.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::{instrument, warn};
use utoipa::ToSchema;

use super::row_u64;
use crate::api::AppState;

/// Record counts shown on the dashboard
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct DashboardStats {
    #[schema(example = 12)]
    pub projects: u64,
    #[schema(example = 5)]
    pub sectors: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub data: DashboardStats,
}

/// Dashboard statistics
///
/// Reports zero counts when the store returns no rows or fails
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Record counts", body = StatsResponse)
    )
)]
#[instrument(skip(state))]
pub async fn dashboard_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = match state
        .relational()
        .query(
            "SELECT (SELECT COUNT(*) FROM projects) as projects, (SELECT COUNT(*) FROM sectors) as sectors",
            &[],
        )
        .await
    {
        Ok(outcome) => outcome
            .rows()
            .first()
            .map(|row| DashboardStats {
                projects: row_u64(row, "projects"),
                sectors: row_u64(row, "sectors"),
            })
            .unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "dashboard counts unavailable");
            DashboardStats::default()
        }
    };

    Json(StatsResponse {
        success: true,
        data: stats,
    })
}
