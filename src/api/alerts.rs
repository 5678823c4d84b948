//! Alert feed endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::alert::Alert, AppState};

use super::AuthenticatedUser;

#[derive(Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

/// Latest alerts visible to the caller
#[utoipa::path(
    get,
    path = "/alerts",
    tag = "alerts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Alerts", body = Vec<Alert>)
    )
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Alert>>> {
    let alerts = state.services.alerts.list_alerts(&claims).await?;
    Ok(Json(alerts))
}

/// Number of unread alerts
#[utoipa::path(
    get,
    path = "/alerts/unread-count",
    tag = "alerts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse)
    )
)]
pub async fn unread_count(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UnreadCountResponse>> {
    let unread = state.services.alerts.unread_count(&claims).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// Acknowledge one alert
#[utoipa::path(
    put,
    path = "/alerts/{id}/read",
    tag = "alerts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Alert ID")),
    responses(
        (status = 204, description = "Alert acknowledged"),
        (status = 403, description = "Alert not addressed to the caller"),
        (status = 404, description = "Alert not found")
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.alerts.mark_read(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Acknowledge every visible alert
#[utoipa::path(
    put,
    path = "/alerts/read-all",
    tag = "alerts",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "All alerts acknowledged")
    )
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<StatusCode> {
    state.services.alerts.mark_all_read(&claims).await?;
    Ok(StatusCode::NO_CONTENT)
}
