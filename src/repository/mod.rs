//! Repository layer for database operations

pub mod alerts;
pub mod bookings;
pub mod users;
pub mod vehicles;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub vehicles: vehicles::VehiclesRepository,
    pub bookings: bookings::BookingsRepository,
    pub alerts: alerts::AlertsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            vehicles: vehicles::VehiclesRepository::new(pool.clone()),
            bookings: bookings::BookingsRepository::new(pool.clone()),
            alerts: alerts::AlertsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}
