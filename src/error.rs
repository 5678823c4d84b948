//! Error types for the Motorpool server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::models::enums::BookingStatus;

/// Application error codes surfaced in JSON error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchUser = 4,
    NoSuchVehicle = 5,
    VehicleUnavailable = 6,
    Duplicate = 7,
    InvalidInterval = 8,
    IntervalConflict = 9,
    InvalidStatus = 10,
    InvalidTransition = 11,
    OutOfOrderReturn = 12,
    MileageRegression = 13,
    BadValue = 14,
    NoSuchData = 15,
    VehicleReferenced = 16,
}

/// Business-rule failures of the booking engine.
///
/// These are request-local validation failures surfaced directly to the
/// caller; none are retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("End time must be strictly after start time")]
    InvalidInterval,

    #[error("Vehicle {0} not found")]
    VehicleNotFound(i32),

    #[error("Vehicle is under maintenance")]
    VehicleUnavailable,

    #[error("Vehicle is already booked from {start} to {end}")]
    IntervalConflict {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid status value: {0}")]
    InvalidStatus(String),

    #[error("Cannot transition booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Not allowed to perform this operation on the booking")]
    Unauthorized,

    #[error("An earlier approved booking ({earlier_id}) for this vehicle has not been returned yet")]
    OutOfOrderReturn { earlier_id: i32 },

    #[error("End mileage cannot be less than start mileage ({minimum})")]
    MileageRegression { minimum: i32 },

    #[error("A vehicle with this license plate already exists")]
    DuplicatePlate,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Booking(#[from] BookingError),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Structured payload for errors that carry one, e.g. the blocking
    /// interval of a scheduling conflict
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}

impl BookingError {
    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            BookingError::InvalidInterval => (StatusCode::BAD_REQUEST, ErrorCode::InvalidInterval),
            BookingError::VehicleNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchVehicle),
            BookingError::VehicleUnavailable => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::VehicleUnavailable)
            }
            BookingError::IntervalConflict { .. } => {
                (StatusCode::CONFLICT, ErrorCode::IntervalConflict)
            }
            BookingError::InvalidStatus(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidStatus),
            BookingError::InvalidTransition { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InvalidTransition)
            }
            BookingError::Unauthorized => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized),
            BookingError::OutOfOrderReturn { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::OutOfOrderReturn)
            }
            BookingError::MileageRegression { .. } => {
                (StatusCode::BAD_REQUEST, ErrorCode::MileageRegression)
            }
            BookingError::DuplicatePlate => (StatusCode::CONFLICT, ErrorCode::Duplicate),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            BookingError::IntervalConflict { start, end } => Some(json!({
                "conflict_start": start,
                "conflict_end": end,
            })),
            BookingError::OutOfOrderReturn { earlier_id } => Some(json!({
                "earlier_booking_id": earlier_id,
            })),
            BookingError::MileageRegression { minimum } => Some(json!({
                "minimum_mileage": minimum,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone(), None)
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone(), None)
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone(), None)
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone(), None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone(), None)
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Booking(e) => {
                let (status, code) = e.status_and_code();
                (status, code, e.to_string(), e.details())
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
