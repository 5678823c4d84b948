//! Vehicle registry endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::vehicle::{CreateVehicle, UpdateMileage, UpdateVehicle, UpdateVehicleStatus, Vehicle},
    AppState,
};

use super::AuthenticatedUser;

/// List all vehicles
#[utoipa::path(
    get,
    path = "/vehicles",
    tag = "vehicles",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All vehicles", body = Vec<Vehicle>)
    )
)]
pub async fn list_vehicles(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Vehicle>>> {
    let vehicles = state.services.fleet.list_vehicles().await?;
    Ok(Json(vehicles))
}

/// Get one vehicle
#[utoipa::path(
    get,
    path = "/vehicles/{id}",
    tag = "vehicles",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Vehicle", body = Vehicle),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn get_vehicle(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vehicle>> {
    let vehicle = state.services.fleet.get_vehicle(id).await?;
    Ok(Json(vehicle))
}

/// Register a new vehicle (admin)
#[utoipa::path(
    post,
    path = "/vehicles",
    tag = "vehicles",
    security(("bearer_auth" = [])),
    request_body = CreateVehicle,
    responses(
        (status = 201, description = "Vehicle registered", body = Vehicle),
        (status = 403, description = "Administrator privileges required"),
        (status = 409, description = "License plate already registered")
    )
)]
pub async fn create_vehicle(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateVehicle>,
) -> AppResult<(StatusCode, Json<Vehicle>)> {
    let vehicle = state.services.fleet.register_vehicle(&claims, &request).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// Update vehicle attributes (admin)
#[utoipa::path(
    put,
    path = "/vehicles/{id}",
    tag = "vehicles",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Vehicle ID")),
    request_body = UpdateVehicle,
    responses(
        (status = 200, description = "Vehicle updated", body = Vehicle),
        (status = 404, description = "Vehicle not found"),
        (status = 409, description = "License plate already registered")
    )
)]
pub async fn update_vehicle(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateVehicle>,
) -> AppResult<Json<Vehicle>> {
    let vehicle = state.services.fleet.update_vehicle(&claims, id, &request).await?;
    Ok(Json(vehicle))
}

/// Correct the odometer reading (admin)
#[utoipa::path(
    put,
    path = "/vehicles/{id}/mileage",
    tag = "vehicles",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Vehicle ID")),
    request_body = UpdateMileage,
    responses(
        (status = 200, description = "Mileage updated", body = Vehicle),
        (status = 404, description = "Vehicle not found"),
        (status = 400, description = "Mileage lower than the recorded odometer")
    )
)]
pub async fn update_mileage(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateMileage>,
) -> AppResult<Json<Vehicle>> {
    let vehicle = state
        .services
        .fleet
        .update_mileage(&claims, id, request.mileage)
        .await?;
    Ok(Json(vehicle))
}

/// Record a completed service (admin)
#[utoipa::path(
    post,
    path = "/vehicles/{id}/service",
    tag = "vehicles",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Vehicle ID")),
    responses(
        (status = 200, description = "Service recorded", body = Vehicle),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn mark_serviced(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vehicle>> {
    let vehicle = state.services.fleet.mark_serviced(&claims, id).await?;
    Ok(Json(vehicle))
}

/// Administrative status override (admin)
#[utoipa::path(
    put,
    path = "/vehicles/{id}/status",
    tag = "vehicles",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Vehicle ID")),
    request_body = UpdateVehicleStatus,
    responses(
        (status = 200, description = "Status updated", body = Vehicle),
        (status = 404, description = "Vehicle not found")
    )
)]
pub async fn set_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateVehicleStatus>,
) -> AppResult<Json<Vehicle>> {
    let vehicle = state
        .services
        .fleet
        .set_status(&claims, id, request.status)
        .await?;
    Ok(Json(vehicle))
}

/// Delete a vehicle with no booking history (admin)
#[utoipa::path(
    delete,
    path = "/vehicles/{id}",
    tag = "vehicles",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Vehicle ID")),
    responses(
        (status = 204, description = "Vehicle deleted"),
        (status = 404, description = "Vehicle not found"),
        (status = 409, description = "Vehicle has bookings")
    )
)]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.fleet.delete_vehicle(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
