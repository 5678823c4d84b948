//! Reporting service: aggregate fleet and booking statistics

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::UserClaims,
    repository::Repository,
};

/// Bookings recorded against one vehicle
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct VehicleUsage {
    pub vehicle_id: i32,
    pub license_plate: String,
    pub booking_count: i64,
    pub total_distance_km: Option<i64>,
}

/// Bookings created per calendar month
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct MonthlyBookings {
    pub month: String,
    pub booking_count: i64,
}

/// Fleet-wide report
#[derive(Debug, Serialize, ToSchema)]
pub struct FleetStats {
    pub total_vehicles: i64,
    pub total_bookings: i64,
    pub pending_bookings: i64,
    pub approved_bookings: i64,
    pub vehicle_usage: Vec<VehicleUsage>,
    pub monthly_bookings: Vec<MonthlyBookings>,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Build the fleet report (admin)
    pub async fn fleet_stats(&self, claims: &UserClaims) -> AppResult<FleetStats> {
        claims.require_admin()?;

        let total_vehicles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vehicles")
            .fetch_one(&self.repository.pool)
            .await?;

        let total_bookings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.repository.pool)
            .await?;

        let pending_bookings: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE status = 'pending'")
                .fetch_one(&self.repository.pool)
                .await?;

        let approved_bookings: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE status = 'approved'")
                .fetch_one(&self.repository.pool)
                .await?;

        let vehicle_usage = sqlx::query_as::<_, VehicleUsage>(
            r#"
            SELECT v.id AS vehicle_id, v.license_plate,
                   COUNT(b.id) AS booking_count,
                   SUM(b.end_mileage - b.start_mileage)::int8 AS total_distance_km
            FROM vehicles v
            LEFT JOIN bookings b ON b.vehicle_id = v.id
            GROUP BY v.id, v.license_plate
            ORDER BY booking_count DESC
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;

        let monthly_bookings = sqlx::query_as::<_, MonthlyBookings>(
            r#"
            SELECT TO_CHAR(created_at, 'YYYY-MM') AS month, COUNT(*) AS booking_count
            FROM bookings
            GROUP BY month
            ORDER BY month DESC
            LIMIT 12
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(FleetStats {
            total_vehicles,
            total_bookings,
            pending_bookings,
            approved_bookings,
            vehicle_usage,
            monthly_bookings,
        })
    }
}
