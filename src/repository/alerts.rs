//! Alerts repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::alert::{Alert, NewAlert},
};

#[derive(Clone)]
pub struct AlertsRepository {
    pool: Pool<Postgres>,
}

impl AlertsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get alert by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Alert> {
        sqlx::query_as::<_, Alert>("SELECT * FROM alerts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Alert with id {} not found", id)))
    }

    /// Insert a new alert
    pub async fn create(&self, alert: &NewAlert) -> AppResult<Alert> {
        let created = sqlx::query_as::<_, Alert>(
            r#"
            INSERT INTO alerts (user_id, vehicle_id, title, message, kind)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(alert.user_id)
        .bind(alert.vehicle_id)
        .bind(&alert.title)
        .bind(&alert.message)
        .bind(alert.kind)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Latest alerts visible to a user. Approvers additionally see
    /// broadcast alerts (user_id NULL).
    pub async fn list_visible(&self, user_id: i32, include_broadcast: bool) -> AppResult<Vec<Alert>> {
        let alerts = sqlx::query_as::<_, Alert>(
            r#"
            SELECT * FROM alerts
            WHERE user_id = $1 OR ($2 AND user_id IS NULL)
            ORDER BY created_at DESC
            LIMIT 50
            "#,
        )
        .bind(user_id)
        .bind(include_broadcast)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    /// Number of unread alerts visible to a user
    pub async fn unread_count(&self, user_id: i32, include_broadcast: bool) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM alerts
            WHERE (user_id = $1 OR ($2 AND user_id IS NULL)) AND is_read = FALSE
            "#,
        )
        .bind(user_id)
        .bind(include_broadcast)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Flip the read flag of one alert
    pub async fn mark_read(&self, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE alerts SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Mark every alert visible to the user as read
    pub async fn mark_all_read(&self, user_id: i32, include_broadcast: bool) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE alerts SET is_read = TRUE
            WHERE (user_id = $1 OR ($2 AND user_id IS NULL)) AND is_read = FALSE
            "#,
        )
        .bind(user_id)
        .bind(include_broadcast)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Whether an unresolved maintenance alert already exists for the
    /// vehicle. Used to suppress duplicates until the alert is acknowledged
    /// or the vehicle is serviced.
    pub async fn has_unread_maintenance(&self, vehicle_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM alerts
                WHERE vehicle_id = $1 AND kind = 'maintenance' AND is_read = FALSE
            )
            "#,
        )
        .bind(vehicle_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
