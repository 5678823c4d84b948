//! Lifecycle monitor: maintenance-due and overdue-return detection.
//!
//! Reads the vehicle registry and the booking ledger, owns alert creation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{
    config::MaintenanceConfig,
    error::AppResult,
    models::{
        alert::NewAlert,
        booking::OverdueBooking,
        enums::AlertKind,
    },
    repository::Repository,
    services::notifier::Notifier,
};

/// True when the odometer has crossed a service-interval multiple since the
/// last recorded maintenance, or drifted a full interval past it.
///
/// Example with interval 10 000: last 9 500, current 10 050 is due (the
/// 10 000 mark was crossed); last 0, current 9 999 is not.
pub fn maintenance_due(current_mileage: i32, last_maintenance_mileage: i32, interval_km: i32) -> bool {
    if interval_km <= 0 {
        return false;
    }
    current_mileage / interval_km > last_maintenance_mileage / interval_km
        || current_mileage - last_maintenance_mileage >= interval_km
}

/// Outcome of one daily sweep
#[derive(Debug, Default)]
pub struct DailyCheckReport {
    pub overdue_bookings: usize,
    pub vehicles_due: usize,
    /// True when another sweep was already in flight and this one did nothing
    pub skipped: bool,
}

#[derive(Clone)]
pub struct MonitorService {
    repository: Repository,
    notifier: Notifier,
    config: MaintenanceConfig,
    daily_lock: Arc<Mutex<()>>,
}

impl MonitorService {
    pub fn new(repository: Repository, notifier: Notifier, config: MaintenanceConfig) -> Self {
        Self {
            repository,
            notifier,
            config,
            daily_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Check one vehicle against the service interval. Returns whether the
    /// threshold condition holds; the broadcast alert itself is suppressed
    /// while an unread maintenance alert for the vehicle exists, so repeated
    /// checks before servicing do not pile up duplicates.
    pub async fn check_maintenance(&self, vehicle_id: i32) -> AppResult<bool> {
        let vehicle = self.repository.vehicles.get_by_id(vehicle_id).await?;

        let due = maintenance_due(
            vehicle.current_mileage,
            vehicle.last_maintenance_mileage,
            self.config.interval_km,
        );
        if !due {
            return Ok(false);
        }

        if self.repository.alerts.has_unread_maintenance(vehicle_id).await? {
            tracing::debug!(
                "Maintenance alert for vehicle {} already pending, not re-emitting",
                vehicle_id
            );
            return Ok(true);
        }

        let alert = NewAlert {
            user_id: None,
            vehicle_id: Some(vehicle_id),
            title: format!("Maintenance Due: {}", vehicle.label()),
            message: format!(
                "Vehicle {} has reached {} km. Last maintenance was recorded at {} km; \
                 it is now due for its {} km service.",
                vehicle.label(),
                vehicle.current_mileage,
                vehicle.last_maintenance_mileage,
                self.config.interval_km,
            ),
            kind: AlertKind::Maintenance,
        };
        self.repository.alerts.create(&alert).await?;
        self.notifier.maintenance_due(&vehicle, self.config.interval_km);

        tracing::info!("Vehicle {} is due for maintenance", vehicle_id);
        Ok(true)
    }

    /// Approved bookings past their end time. One warning alert is emitted
    /// per booking per scan; a still-overdue booking is re-reported on the
    /// next day's scan, which is the intended daily reminder.
    pub async fn scan_overdue_bookings(
        &self,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<OverdueBooking>> {
        let overdue = self.repository.bookings.list_overdue(now).await?;

        for entry in &overdue {
            let alert = NewAlert {
                user_id: None,
                vehicle_id: Some(entry.vehicle_id),
                title: format!("Overdue Return: {}", entry.license_plate),
                message: format!(
                    "Vehicle {} {} ({}) overdue since {}.",
                    entry.brand.as_deref().unwrap_or(""),
                    entry.model.as_deref().unwrap_or(""),
                    entry.license_plate,
                    entry.end_time.format("%Y-%m-%d %H:%M"),
                ),
                kind: AlertKind::Warning,
            };
            self.repository.alerts.create(&alert).await?;
        }

        Ok(overdue)
    }

    /// Daily sweep: overdue scan, then a full-fleet maintenance pass.
    /// At most one sweep runs at a time; a second invocation while one is
    /// in flight returns a skipped report instead of doubling the alerts.
    pub async fn run_daily_check(&self, now: DateTime<Utc>) -> AppResult<DailyCheckReport> {
        let _guard = match self.daily_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!("Daily check already running, skipping this invocation");
                return Ok(DailyCheckReport {
                    skipped: true,
                    ..Default::default()
                });
            }
        };

        tracing::info!("Running daily vehicle status checks");

        let overdue = self.scan_overdue_bookings(now).await?;
        self.notifier.overdue_summary(&overdue);
        tracing::info!("Checked overdue bookings: found {}", overdue.len());

        let mut vehicles_due = 0;
        for vehicle in self.repository.vehicles.list().await? {
            if self.check_maintenance(vehicle.id).await? {
                vehicles_due += 1;
            }
        }
        tracing::info!("Checked maintenance: {} vehicles due", vehicles_due);

        Ok(DailyCheckReport {
            overdue_bookings: overdue.len(),
            vehicles_due,
            skipped: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_when_interval_multiple_crossed() {
        assert!(maintenance_due(10_050, 9_500, 10_000));
        assert!(maintenance_due(20_001, 19_999, 10_000));
    }

    #[test]
    fn test_due_when_full_interval_elapsed() {
        assert!(maintenance_due(25_000, 15_000, 10_000));
        assert!(maintenance_due(15_000, 5_000, 10_000));
    }

    #[test]
    fn test_not_due_below_threshold() {
        assert!(!maintenance_due(9_999, 0, 10_000));
        assert!(!maintenance_due(10_500, 10_050, 10_000));
        assert!(!maintenance_due(0, 0, 10_000));
    }

    #[test]
    fn test_exact_boundary_is_due() {
        assert!(maintenance_due(10_000, 0, 10_000));
        assert!(maintenance_due(20_000, 10_000, 10_000));
    }

    #[test]
    fn test_nonpositive_interval_never_due() {
        assert!(!maintenance_due(50_000, 0, 0));
        assert!(!maintenance_due(50_000, 0, -1));
    }
}
