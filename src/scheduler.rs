//! Daily trigger for the lifecycle monitor.
//!
//! A background task sleeps until the configured UTC hour, fires the daily
//! check and reschedules. The monitor itself guards against concurrent runs,
//! so an operator invoking the sweep manually while the timer fires is safe.

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::services::monitor::MonitorService;

/// Next occurrence of `hour:00:00` UTC strictly after `now`
pub fn next_run_at(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let today = now
        .with_hour(hour)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Spawn the daily check loop
pub fn spawn_daily_check(monitor: MonitorService, hour: u32) {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next = next_run_at(now, hour);
            let wait = (next - now)
                .to_std()
                .unwrap_or_else(|_| std::time::Duration::from_secs(60));

            tracing::info!("Next daily check scheduled at {}", next);
            tokio::time::sleep(wait).await;

            if let Err(e) = monitor.run_daily_check(Utc::now()).await {
                tracing::error!("Daily check failed: {}", e);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_run_later_today() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 5, 30, 0).unwrap();
        let next = next_run_at(now, 7);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 10, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_next_run_tomorrow_when_hour_passed() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 9, 0, 0).unwrap();
        let next = next_run_at(now, 7);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 11, 7, 0, 0).unwrap());
    }

    #[test]
    fn test_exact_hour_schedules_tomorrow() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 7, 0, 0).unwrap();
        let next = next_run_at(now, 7);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 11, 7, 0, 0).unwrap());
    }
}
