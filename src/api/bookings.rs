//! Booking ledger endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        booking::{Booking, BookingDetails, CreateBooking, OverdueBooking},
        vehicle::Vehicle,
    },
    AppState,
};

use super::AuthenticatedUser;

/// Approver decision request
#[derive(Deserialize, ToSchema)]
pub struct SetStatusRequest {
    /// Target status: approved, rejected or cancelled
    pub status: String,
}

/// Vehicle return request
#[derive(Deserialize, ToSchema)]
pub struct ReturnRequest {
    /// Odometer reading at return, in kilometers
    pub end_mileage: i32,
}

/// Availability window query
#[derive(Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    /// Window start (ISO 8601)
    pub start_time: DateTime<Utc>,
    /// Window end (ISO 8601)
    pub end_time: DateTime<Utc>,
}

/// Request a booking
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking admitted in pending", body = Booking),
        (status = 404, description = "Vehicle not found"),
        (status = 409, description = "Window conflicts with an approved booking"),
        (status = 422, description = "Vehicle under maintenance"),
        (status = 400, description = "Invalid interval")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    let booking = state
        .services
        .bookings
        .request_booking(&claims, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// List bookings: the whole ledger for admins, own bookings otherwise
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Bookings", body = Vec<BookingDetails>)
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let bookings = state.services.bookings.list_bookings(&claims).await?;
    Ok(Json(bookings))
}

/// Get one booking
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 403, description = "Not the booking owner"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Booking>> {
    let booking = state.services.bookings.get_booking(&claims, id).await?;
    Ok(Json(booking))
}

/// Approver decision: approve, reject or cancel a booking (admin)
#[utoipa::path(
    put,
    path = "/bookings/{id}/status",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Booking),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Window now conflicts with another approval"),
        (status = 422, description = "Transition not allowed"),
        (status = 400, description = "Unknown target status")
    )
)]
pub async fn set_status(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<SetStatusRequest>,
) -> AppResult<Json<Booking>> {
    let booking = state
        .services
        .bookings
        .set_status(&claims, id, &request.status)
        .await?;
    Ok(Json(booking))
}

/// Return the vehicle and complete the booking
#[utoipa::path(
    post,
    path = "/bookings/{id}/return",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Booking completed", body = Booking),
        (status = 403, description = "Not the booking owner"),
        (status = 404, description = "Booking not found"),
        (status = 422, description = "Earlier booking still open, or booking not approved"),
        (status = 400, description = "End mileage below the hand-off start mileage")
    )
)]
pub async fn return_vehicle(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<Booking>> {
    let booking = state
        .services
        .bookings
        .return_vehicle(&claims, id, request.end_mileage)
        .await?;
    Ok(Json(booking))
}

/// Cancel a booking (owner or admin)
#[utoipa::path(
    post,
    path = "/bookings/{id}/cancel",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking cancelled", body = Booking),
        (status = 403, description = "Not the booking owner"),
        (status = 404, description = "Booking not found"),
        (status = 422, description = "Booking already terminal")
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Booking>> {
    let booking = state.services.bookings.cancel_booking(&claims, id).await?;
    Ok(Json(booking))
}

/// Vehicles free to book over a window
#[utoipa::path(
    get,
    path = "/bookings/available-vehicles",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Available vehicles", body = Vec<Vehicle>),
        (status = 400, description = "Invalid interval")
    )
)]
pub async fn available_vehicles(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<Vehicle>>> {
    let vehicles = state
        .services
        .bookings
        .available_vehicles(query.start_time, query.end_time)
        .await?;
    Ok(Json(vehicles))
}

/// Approved bookings past their end time (admin)
#[utoipa::path(
    get,
    path = "/bookings/overdue",
    tag = "bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue bookings", body = Vec<OverdueBooking>),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_overdue(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<OverdueBooking>>> {
    let overdue = state.services.bookings.list_overdue(&claims).await?;
    Ok(Json(overdue))
}
