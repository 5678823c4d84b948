//! Booking ledger service: admission, approval workflow, returns.

use chrono::{DateTime, Utc};

use crate::{
    error::{AppResult, BookingError},
    models::{
        alert::NewAlert,
        booking::{Booking, BookingDetails, CreateBooking, OverdueBooking},
        enums::{AlertKind, BookingStatus},
        user::UserClaims,
        vehicle::Vehicle,
    },
    repository::Repository,
    services::{monitor::MonitorService, notifier::Notifier},
};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
    notifier: Notifier,
    monitor: MonitorService,
}

impl BookingsService {
    pub fn new(repository: Repository, notifier: Notifier, monitor: MonitorService) -> Self {
        Self {
            repository,
            notifier,
            monitor,
        }
    }

    fn check_owner_or_admin(claims: &UserClaims, booking: &Booking) -> AppResult<()> {
        if booking.user_id != claims.user_id && !claims.is_admin() {
            return Err(BookingError::Unauthorized.into());
        }
        Ok(())
    }

    /// Admit a booking request in `pending` and notify the approver
    pub async fn request_booking(
        &self,
        claims: &UserClaims,
        request: &CreateBooking,
    ) -> AppResult<Booking> {
        if request.start_time >= request.end_time {
            return Err(BookingError::InvalidInterval.into());
        }

        let booking = self.repository.bookings.create(claims.user_id, request).await?;

        tracing::info!(
            "Booking {} created by user {} for vehicle {}",
            booking.id,
            claims.user_id,
            booking.vehicle_id
        );

        let requester = self.repository.users.get_by_id(claims.user_id).await?;
        let vehicle = self.repository.vehicles.get_by_id(booking.vehicle_id).await?;

        // Broadcast alert for the approvers
        self.repository
            .alerts
            .create(&NewAlert {
                user_id: None,
                vehicle_id: Some(booking.vehicle_id),
                title: format!("New Booking Request: {}", vehicle.label()),
                message: format!(
                    "{} requested {} from {} to {}.",
                    requester.full_name.as_deref().unwrap_or(&requester.email),
                    vehicle.label(),
                    booking.start_time.format("%Y-%m-%d %H:%M"),
                    booking.end_time.format("%Y-%m-%d %H:%M"),
                ),
                kind: AlertKind::Info,
            })
            .await?;

        self.notifier.booking_created(&booking, &requester, &vehicle);

        Ok(booking)
    }

    /// Get one booking; non-admins only see their own
    pub async fn get_booking(&self, claims: &UserClaims, id: i32) -> AppResult<Booking> {
        let booking = self.repository.bookings.get_by_id(id).await?;
        Self::check_owner_or_admin(claims, &booking)?;
        Ok(booking)
    }

    /// List bookings: the whole ledger for admins, own bookings otherwise
    pub async fn list_bookings(&self, claims: &UserClaims) -> AppResult<Vec<BookingDetails>> {
        if claims.is_admin() {
            self.repository.bookings.list_all().await
        } else {
            self.repository.bookings.list_for_user(claims.user_id).await
        }
    }

    /// Approver decision on a booking. Accepts `approved`, `rejected` and
    /// `cancelled` as targets; completion only happens through the return
    /// operation so the mileage chain cannot be skipped.
    pub async fn set_status(
        &self,
        claims: &UserClaims,
        id: i32,
        target: &str,
    ) -> AppResult<Booking> {
        claims.require_admin()?;

        let target: BookingStatus = target
            .parse()
            .map_err(|_| BookingError::InvalidStatus(target.to_string()))?;
        if matches!(target, BookingStatus::Pending | BookingStatus::Completed) {
            return Err(BookingError::InvalidStatus(target.to_string()).into());
        }

        let booking = self.repository.bookings.get_by_id(id).await?;
        if !booking.status.can_transition_to(target) {
            return Err(BookingError::InvalidTransition {
                from: booking.status,
                to: target,
            }
            .into());
        }

        let updated = match target {
            // approval re-validates the window under the vehicle lock
            BookingStatus::Approved => self.repository.bookings.approve(id).await?,
            _ => {
                self.repository
                    .bookings
                    .update_status(id, booking.status, target)
                    .await?
            }
        };

        tracing::info!("Booking {} moved to {}", id, updated.status);

        let owner = self.repository.users.get_by_id(updated.user_id).await?;
        let vehicle = self.repository.vehicles.get_by_id(updated.vehicle_id).await?;

        // Alert targeted at the booking owner
        self.repository
            .alerts
            .create(&NewAlert {
                user_id: Some(updated.user_id),
                vehicle_id: Some(updated.vehicle_id),
                title: format!("Booking {}: {}", updated.status, vehicle.label()),
                message: format!(
                    "Your booking of {} from {} to {} is now {}.",
                    vehicle.label(),
                    updated.start_time.format("%Y-%m-%d %H:%M"),
                    updated.end_time.format("%Y-%m-%d %H:%M"),
                    updated.status,
                ),
                kind: AlertKind::Info,
            })
            .await?;

        self.notifier.booking_status_changed(&updated, &owner, &vehicle);

        Ok(updated)
    }

    /// Return the vehicle: completes the booking, advances the odometer and
    /// immediately re-evaluates the service interval for the vehicle.
    pub async fn return_vehicle(
        &self,
        claims: &UserClaims,
        id: i32,
        end_mileage: i32,
    ) -> AppResult<Booking> {
        let booking = self.repository.bookings.get_by_id(id).await?;
        Self::check_owner_or_admin(claims, &booking)?;

        let completed = self.repository.bookings.complete(id, end_mileage).await?;

        tracing::info!(
            "Booking {} completed at {} km (vehicle {})",
            id,
            end_mileage,
            completed.vehicle_id
        );

        self.monitor.check_maintenance(completed.vehicle_id).await?;

        let owner = self.repository.users.get_by_id(completed.user_id).await?;
        let vehicle = self.repository.vehicles.get_by_id(completed.vehicle_id).await?;
        self.notifier.booking_status_changed(&completed, &owner, &vehicle);

        Ok(completed)
    }

    /// Cancel a booking; owners may cancel their own, admins any
    pub async fn cancel_booking(&self, claims: &UserClaims, id: i32) -> AppResult<Booking> {
        let booking = self.repository.bookings.get_by_id(id).await?;
        Self::check_owner_or_admin(claims, &booking)?;

        if !booking.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(BookingError::InvalidTransition {
                from: booking.status,
                to: BookingStatus::Cancelled,
            }
            .into());
        }

        let cancelled = self
            .repository
            .bookings
            .update_status(id, booking.status, BookingStatus::Cancelled)
            .await?;

        tracing::info!("Booking {} cancelled by user {}", id, claims.user_id);

        let owner = self.repository.users.get_by_id(cancelled.user_id).await?;
        let vehicle = self.repository.vehicles.get_by_id(cancelled.vehicle_id).await?;
        self.notifier.booking_status_changed(&cancelled, &owner, &vehicle);

        Ok(cancelled)
    }

    /// Vehicles free to book over the given window
    pub async fn available_vehicles(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Vehicle>> {
        if start >= end {
            return Err(BookingError::InvalidInterval.into());
        }
        self.repository.bookings.available_vehicles(start, end).await
    }

    /// Approved bookings past their end time (approver view)
    pub async fn list_overdue(&self, claims: &UserClaims) -> AppResult<Vec<OverdueBooking>> {
        claims.require_admin()?;
        self.repository.bookings.list_overdue(Utc::now()).await
    }
}
