//! Vehicle model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::VehicleStatus;

/// Vehicle model from database.
///
/// `current_mileage` is monotonic non-decreasing; it only moves forward when
/// a booking is completed. `last_maintenance_mileage` never exceeds
/// `current_mileage` at the time of service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Vehicle {
    pub id: i32,
    pub license_plate: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub current_mileage: i32,
    pub last_maintenance_mileage: i32,
    pub status: VehicleStatus,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    /// Human-readable label used in alerts and emails
    pub fn label(&self) -> String {
        match (&self.brand, &self.model) {
            (Some(b), Some(m)) => format!("{} {} ({})", b, m, self.license_plate),
            (Some(b), None) => format!("{} ({})", b, self.license_plate),
            (None, Some(m)) => format!("{} ({})", m, self.license_plate),
            (None, None) => self.license_plate.clone(),
        }
    }
}

/// Register vehicle request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVehicle {
    #[validate(length(min = 1, message = "License plate is required"))]
    pub license_plate: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    #[validate(range(min = 0, message = "Mileage cannot be negative"))]
    pub current_mileage: Option<i32>,
    #[validate(range(min = 0, message = "Mileage cannot be negative"))]
    pub last_maintenance_mileage: Option<i32>,
    pub status: Option<VehicleStatus>,
}

/// Update vehicle request (admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateVehicle {
    #[validate(length(min = 1, message = "License plate cannot be empty"))]
    pub license_plate: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub status: Option<VehicleStatus>,
}

/// Mileage correction request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMileage {
    pub mileage: i32,
}

/// Administrative status override request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateVehicleStatus {
    pub status: VehicleStatus,
}
