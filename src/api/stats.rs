//! Reporting endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, services::stats::FleetStats, AppState};

use super::AuthenticatedUser;

/// Fleet-wide report (admin)
#[utoipa::path(
    get,
    path = "/reports/stats",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Fleet statistics", body = FleetStats),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn fleet_stats(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<FleetStats>> {
    let stats = state.services.stats.fleet_stats(&claims).await?;
    Ok(Json(stats))
}
