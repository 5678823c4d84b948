//! Vehicles repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, BookingError},
    models::{
        enums::VehicleStatus,
        vehicle::{CreateVehicle, UpdateVehicle, Vehicle},
    },
};

#[derive(Clone)]
pub struct VehiclesRepository {
    pool: Pool<Postgres>,
}

impl VehiclesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get vehicle by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::Booking(BookingError::VehicleNotFound(id)))
    }

    /// List all vehicles
    pub async fn list(&self) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(vehicles)
    }

    /// Register a new vehicle
    pub async fn create(&self, vehicle: &CreateVehicle) -> AppResult<Vehicle> {
        let plate_taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1)",
        )
        .bind(&vehicle.license_plate)
        .fetch_one(&self.pool)
        .await?;

        if plate_taken {
            return Err(BookingError::DuplicatePlate.into());
        }

        let created = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (license_plate, brand, model, color, current_mileage,
                                  last_maintenance_mileage, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&vehicle.license_plate)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(&vehicle.color)
        .bind(vehicle.current_mileage.unwrap_or(0))
        .bind(vehicle.last_maintenance_mileage.unwrap_or(0))
        .bind(vehicle.status.unwrap_or(VehicleStatus::Available))
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update vehicle attributes
    pub async fn update(&self, id: i32, update: &UpdateVehicle) -> AppResult<Vehicle> {
        let vehicle = self.get_by_id(id).await?;

        if let Some(ref plate) = update.license_plate {
            if plate != &vehicle.license_plate {
                let plate_taken: bool = sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM vehicles WHERE license_plate = $1 AND id != $2)",
                )
                .bind(plate)
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

                if plate_taken {
                    return Err(BookingError::DuplicatePlate.into());
                }
            }
        }

        let updated = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET license_plate = COALESCE($2, license_plate),
                brand = COALESCE($3, brand),
                model = COALESCE($4, model),
                color = COALESCE($5, color),
                status = COALESCE($6, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.license_plate)
        .bind(&update.brand)
        .bind(&update.model)
        .bind(&update.color)
        .bind(update.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Correct the recorded mileage. The odometer only moves forward.
    pub async fn update_mileage(&self, id: i32, new_mileage: i32) -> AppResult<Vehicle> {
        let vehicle = self.get_by_id(id).await?;

        if new_mileage < vehicle.current_mileage {
            return Err(BookingError::MileageRegression {
                minimum: vehicle.current_mileage,
            }
            .into());
        }

        let updated = sqlx::query_as::<_, Vehicle>(
            "UPDATE vehicles SET current_mileage = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(new_mileage)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Record a completed service: the maintenance baseline catches up with
    /// the odometer and the vehicle becomes available again.
    pub async fn mark_serviced(&self, id: i32) -> AppResult<Vehicle> {
        self.get_by_id(id).await?;

        let updated = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET last_maintenance_mileage = current_mileage, status = 'available'
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Administrative status override
    pub async fn set_status(&self, id: i32, status: VehicleStatus) -> AppResult<Vehicle> {
        self.get_by_id(id).await?;

        let updated = sqlx::query_as::<_, Vehicle>(
            "UPDATE vehicles SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a vehicle. Rejected while any booking references it so the
    /// ledger history stays intact.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.get_by_id(id).await?;

        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE vehicle_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if referenced {
            return Err(AppError::Conflict(
                "Vehicle has bookings and cannot be deleted".to_string(),
            ));
        }

        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
