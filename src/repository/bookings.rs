//! Bookings repository: the ledger's transactional state machine.
//!
//! Every mutating operation that evaluates the calendar runs inside a single
//! transaction holding the vehicle row lock, so two concurrent requests for
//! overlapping windows on the same vehicle serialize at the check.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult, BookingError},
    models::{
        booking::{windows_overlap, Booking, BookingDetails, CreateBooking, OverdueBooking},
        enums::{BookingStatus, VehicleStatus},
        vehicle::Vehicle,
    },
};

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get booking by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", id)))
    }

    /// List all bookings with requester and vehicle context (approver view)
    pub async fn list_all(&self) -> AppResult<Vec<BookingDetails>> {
        let bookings = sqlx::query_as::<_, BookingDetails>(
            r#"
            SELECT b.*, u.full_name AS user_name, u.phone AS user_phone,
                   v.license_plate, TRIM(CONCAT(v.brand, ' ', v.model)) AS vehicle_model
            FROM bookings b
            JOIN users u ON b.user_id = u.id
            JOIN vehicles v ON b.vehicle_id = v.id
            ORDER BY b.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// List bookings created by one user
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<BookingDetails>> {
        let bookings = sqlx::query_as::<_, BookingDetails>(
            r#"
            SELECT b.*, u.full_name AS user_name, u.phone AS user_phone,
                   v.license_plate, TRIM(CONCAT(v.brand, ' ', v.model)) AS vehicle_model
            FROM bookings b
            JOIN users u ON b.user_id = u.id
            JOIN vehicles v ON b.vehicle_id = v.id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Lock the vehicle row, returning it. Serializes the check-then-write
    /// sequence for all admission and approval paths on this vehicle.
    async fn lock_vehicle(
        tx: &mut Transaction<'_, Postgres>,
        vehicle_id: i32,
    ) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
            .bind(vehicle_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(AppError::Booking(BookingError::VehicleNotFound(vehicle_id)))
    }

    /// Approved bookings for a vehicle, excluding `exclude_id` if given
    async fn approved_for_vehicle(
        tx: &mut Transaction<'_, Postgres>,
        vehicle_id: i32,
        exclude_id: Option<i32>,
    ) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE vehicle_id = $1 AND status = 'approved' AND ($2::int4 IS NULL OR id != $2)
            ORDER BY start_time
            "#,
        )
        .bind(vehicle_id)
        .bind(exclude_id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(bookings)
    }

    /// Fail with `IntervalConflict` if the window collides with any of the
    /// given approved bookings. Only approved bookings block admission;
    /// pending requests are arbitrated by the approver.
    fn check_window(
        approved: &[Booking],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<()> {
        if let Some(conflict) = approved
            .iter()
            .find(|b| windows_overlap(start, end, b.start_time, b.end_time))
        {
            return Err(BookingError::IntervalConflict {
                start: conflict.start_time,
                end: conflict.end_time,
            }
            .into());
        }
        Ok(())
    }

    /// Admit a booking request: vehicle must exist and not be under
    /// maintenance, and the window must not collide with an approved
    /// booking. Persists the booking in `pending`.
    pub async fn create(&self, user_id: i32, request: &CreateBooking) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        let vehicle = Self::lock_vehicle(&mut tx, request.vehicle_id).await?;
        if vehicle.status == VehicleStatus::Maintenance {
            return Err(BookingError::VehicleUnavailable.into());
        }

        let approved = Self::approved_for_vehicle(&mut tx, request.vehicle_id, None).await?;
        Self::check_window(&approved, request.start_time, request.end_time)?;

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (user_id, vehicle_id, start_time, end_time, objective,
                                  destination, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(request.vehicle_id)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(&request.objective)
        .bind(&request.destination)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(booking)
    }

    /// Approve a pending booking, re-running the overlap check under the
    /// vehicle lock to catch two concurrently pending requests for the same
    /// window.
    pub async fn approve(&self, id: i32) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", id)))?;

        if booking.status != BookingStatus::Pending {
            return Err(BookingError::InvalidTransition {
                from: booking.status,
                to: BookingStatus::Approved,
            }
            .into());
        }

        Self::lock_vehicle(&mut tx, booking.vehicle_id).await?;

        let approved = Self::approved_for_vehicle(&mut tx, booking.vehicle_id, Some(id)).await?;
        Self::check_window(&approved, booking.start_time, booking.end_time)?;

        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = 'approved' WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Status update for rejection and cancellation, conditional on the
    /// expected current status. A concurrent completion or approval between
    /// the service-layer read and this write leaves zero rows matched, so a
    /// terminal booking can never be overwritten.
    pub async fn update_status(
        &self,
        id: i32,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Booking> {
        let updated = sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = $2 WHERE id = $1 AND status = $3 RETURNING *",
        )
        .bind(id)
        .bind(to)
        .bind(from)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(booking) => Ok(booking),
            None => {
                let current = self.get_by_id(id).await?;
                Err(BookingError::InvalidTransition {
                    from: current.status,
                    to,
                }
                .into())
            }
        }
    }

    /// Complete an approved booking with the returned odometer reading.
    ///
    /// Returns must happen in chronological order per vehicle, and each
    /// booking's start mileage is handed off from the previous completed
    /// booking's end mileage (or the vehicle baseline for the first trip).
    /// Booking fields and the vehicle odometer move in one transaction.
    pub async fn complete(&self, id: i32, end_mileage: i32) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", id)))?;

        if booking.status != BookingStatus::Approved {
            return Err(BookingError::InvalidTransition {
                from: booking.status,
                to: BookingStatus::Completed,
            }
            .into());
        }

        let vehicle = Self::lock_vehicle(&mut tx, booking.vehicle_id).await?;

        let earlier_approved: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT id FROM bookings
            WHERE vehicle_id = $1 AND status = 'approved' AND start_time < $2 AND id != $3
            ORDER BY start_time
            LIMIT 1
            "#,
        )
        .bind(booking.vehicle_id)
        .bind(booking.start_time)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(earlier_id) = earlier_approved {
            return Err(BookingError::OutOfOrderReturn { earlier_id }.into());
        }

        // Mileage hand-off: chain from the latest completed trip before
        // this one, falling back to the vehicle's recorded odometer.
        let prior_end: Option<Option<i32>> = sqlx::query_scalar(
            r#"
            SELECT end_mileage FROM bookings
            WHERE vehicle_id = $1 AND status = 'completed' AND start_time < $2
            ORDER BY start_time DESC
            LIMIT 1
            "#,
        )
        .bind(booking.vehicle_id)
        .bind(booking.start_time)
        .fetch_optional(&mut *tx)
        .await?;

        let start_mileage = prior_end.flatten().unwrap_or(vehicle.current_mileage);

        if end_mileage < start_mileage {
            return Err(BookingError::MileageRegression {
                minimum: start_mileage,
            }
            .into());
        }

        let completed = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'completed', start_mileage = $2, end_mileage = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(start_mileage)
        .bind(end_mileage)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE vehicles SET current_mileage = $2 WHERE id = $1")
            .bind(booking.vehicle_id)
            .bind(end_mileage)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(completed)
    }

    /// Approved bookings whose end time has passed
    pub async fn list_overdue(&self, now: DateTime<Utc>) -> AppResult<Vec<OverdueBooking>> {
        let overdue = sqlx::query_as::<_, OverdueBooking>(
            r#"
            SELECT b.id, b.vehicle_id, v.license_plate, v.brand, v.model,
                   u.full_name AS user_name, b.end_time
            FROM bookings b
            JOIN vehicles v ON b.vehicle_id = v.id
            JOIN users u ON b.user_id = u.id
            WHERE b.status = 'approved' AND b.end_time < $1
            ORDER BY b.end_time
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(overdue)
    }

    /// Vehicles that are administratively available and have no approved
    /// booking overlapping the requested window
    pub async fn available_vehicles(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT v.* FROM vehicles v
            WHERE v.status = 'available'
              AND NOT EXISTS (
                  SELECT 1 FROM bookings b
                  WHERE b.vehicle_id = v.id
                    AND b.status = 'approved'
                    AND b.start_time < $2
                    AND b.end_time > $1
              )
            ORDER BY v.id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }
}
