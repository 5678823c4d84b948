//! Booking model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::BookingStatus;

/// Booking model from database.
///
/// Mileage fields stay NULL until the booking is completed through the
/// return operation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: i32,
    pub user_id: i32,
    pub vehicle_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub objective: Option<String>,
    pub destination: Option<String>,
    pub status: BookingStatus,
    pub start_mileage: Option<i32>,
    pub end_mileage: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Booking with requester and vehicle context for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookingDetails {
    pub id: i32,
    pub user_id: i32,
    pub user_name: Option<String>,
    pub user_phone: Option<String>,
    pub vehicle_id: i32,
    pub license_plate: String,
    pub vehicle_model: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub objective: Option<String>,
    pub destination: Option<String>,
    pub status: BookingStatus,
    pub start_mileage: Option<i32>,
    pub end_mileage: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Create booking request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBooking {
    pub vehicle_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub objective: Option<String>,
    pub destination: Option<String>,
}

/// Approved booking past its end time, with context for the overdue alert
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct OverdueBooking {
    pub id: i32,
    pub vehicle_id: i32,
    pub license_plate: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub user_name: Option<String>,
    pub end_time: DateTime<Utc>,
}

/// Half-open interval intersection test: two windows overlap when each one
/// starts before the other ends. Touching boundaries (`a_end == b_start`)
/// do not overlap.
pub fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_overlapping_windows() {
        assert!(windows_overlap(at(9), at(11), at(10), at(12)));
        assert!(windows_overlap(at(10), at(12), at(9), at(11)));
        // full containment
        assert!(windows_overlap(at(9), at(13), at(10), at(11)));
        assert!(windows_overlap(at(10), at(11), at(9), at(13)));
    }

    #[test]
    fn test_touching_boundaries_do_not_overlap() {
        assert!(!windows_overlap(at(9), at(11), at(11), at(13)));
        assert!(!windows_overlap(at(11), at(13), at(9), at(11)));
    }

    #[test]
    fn test_disjoint_windows() {
        assert!(!windows_overlap(at(8), at(9), at(10), at(11)));
        assert!(!windows_overlap(at(10), at(11), at(8), at(9)));
    }
}
