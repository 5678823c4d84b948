//! Business logic services

pub mod alerts;
pub mod bookings;
pub mod email;
pub mod fleet;
pub mod monitor;
pub mod notifier;
pub mod stats;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::{
    config::{AuthConfig, EmailConfig, MaintenanceConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub fleet: fleet::FleetService,
    pub bookings: bookings::BookingsService,
    pub monitor: monitor::MonitorService,
    pub alerts: alerts::AlertsService,
    pub users: users::UsersService,
    pub stats: stats::StatsService,
    pub notifier: notifier::Notifier,
    pool: Pool<Postgres>,
}

impl Services {
    /// Create all services with the given repository. Spawns the email
    /// delivery worker as a side effect.
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        email_config: EmailConfig,
        maintenance_config: MaintenanceConfig,
    ) -> Self {
        let pool = repository.pool.clone();
        let email = email::EmailService::new(email_config.clone());
        let notifier = notifier::Notifier::spawn(email, &email_config);
        let monitor = monitor::MonitorService::new(
            repository.clone(),
            notifier.clone(),
            maintenance_config,
        );

        Self {
            fleet: fleet::FleetService::new(repository.clone(), monitor.clone()),
            bookings: bookings::BookingsService::new(
                repository.clone(),
                notifier.clone(),
                monitor.clone(),
            ),
            monitor,
            alerts: alerts::AlertsService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), notifier.clone(), auth_config),
            stats: stats::StatsService::new(repository),
            notifier,
            pool,
        }
    }

    /// Database handle for liveness probes
    pub fn db(&self) -> &Pool<Postgres> {
        &self.pool
    }
}
