//! Fleet service: vehicle registry operations.
//!
//! All mutations are admin-only; reads are open to any authenticated user.

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::VehicleStatus,
        user::UserClaims,
        vehicle::{CreateVehicle, UpdateVehicle, Vehicle},
    },
    repository::Repository,
    services::monitor::MonitorService,
};

#[derive(Clone)]
pub struct FleetService {
    repository: Repository,
    monitor: MonitorService,
}

impl FleetService {
    pub fn new(repository: Repository, monitor: MonitorService) -> Self {
        Self {
            repository,
            monitor,
        }
    }

    /// Register a new vehicle
    pub async fn register_vehicle(
        &self,
        claims: &UserClaims,
        request: &CreateVehicle,
    ) -> AppResult<Vehicle> {
        claims.require_admin()?;
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let (Some(last), Some(current)) =
            (request.last_maintenance_mileage, request.current_mileage)
        {
            if last > current {
                return Err(AppError::Validation(
                    "Last maintenance mileage cannot exceed current mileage".to_string(),
                ));
            }
        }

        let vehicle = self.repository.vehicles.create(request).await?;
        tracing::info!("Vehicle {} registered ({})", vehicle.id, vehicle.license_plate);
        Ok(vehicle)
    }

    pub async fn get_vehicle(&self, id: i32) -> AppResult<Vehicle> {
        self.repository.vehicles.get_by_id(id).await
    }

    pub async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        self.repository.vehicles.list().await
    }

    /// Update vehicle attributes
    pub async fn update_vehicle(
        &self,
        claims: &UserClaims,
        id: i32,
        request: &UpdateVehicle,
    ) -> AppResult<Vehicle> {
        claims.require_admin()?;
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.vehicles.update(id, request).await
    }

    /// Correct the odometer reading and re-evaluate the service interval
    pub async fn update_mileage(
        &self,
        claims: &UserClaims,
        id: i32,
        new_mileage: i32,
    ) -> AppResult<Vehicle> {
        claims.require_admin()?;

        let updated = self.repository.vehicles.update_mileage(id, new_mileage).await?;
        tracing::info!("Vehicle {} mileage corrected to {} km", id, new_mileage);

        self.monitor.check_maintenance(id).await?;

        Ok(updated)
    }

    /// Record a completed service
    pub async fn mark_serviced(&self, claims: &UserClaims, id: i32) -> AppResult<Vehicle> {
        claims.require_admin()?;
        let vehicle = self.repository.vehicles.mark_serviced(id).await?;
        tracing::info!(
            "Vehicle {} serviced at {} km",
            id,
            vehicle.last_maintenance_mileage
        );
        Ok(vehicle)
    }

    /// Administrative status override; `maintenance` blocks new admissions
    pub async fn set_status(
        &self,
        claims: &UserClaims,
        id: i32,
        status: VehicleStatus,
    ) -> AppResult<Vehicle> {
        claims.require_admin()?;
        let vehicle = self.repository.vehicles.set_status(id, status).await?;
        tracing::info!("Vehicle {} status set to {}", id, status);
        Ok(vehicle)
    }

    /// Delete a vehicle with no booking history
    pub async fn delete_vehicle(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        claims.require_admin()?;
        self.repository.vehicles.delete(id).await?;
        tracing::info!("Vehicle {} deleted", id);
        Ok(())
    }
}
