//! Alerts service: read-side of the alert feed.
//!
//! Alerts are created by the lifecycle monitor and the booking workflow;
//! this service exposes listing and acknowledgement.

use crate::{
    error::{AppError, AppResult},
    models::{alert::Alert, user::UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AlertsService {
    repository: Repository,
}

impl AlertsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Latest alerts visible to the caller; admins also see broadcasts
    pub async fn list_alerts(&self, claims: &UserClaims) -> AppResult<Vec<Alert>> {
        self.repository
            .alerts
            .list_visible(claims.user_id, claims.is_admin())
            .await
    }

    pub async fn unread_count(&self, claims: &UserClaims) -> AppResult<i64> {
        self.repository
            .alerts
            .unread_count(claims.user_id, claims.is_admin())
            .await
    }

    /// Acknowledge one alert. Callers may only acknowledge alerts addressed
    /// to them, or broadcasts if they are admins.
    pub async fn mark_read(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        let alert = self.repository.alerts.get_by_id(id).await?;

        let visible = match alert.user_id {
            Some(user_id) => user_id == claims.user_id || claims.is_admin(),
            None => claims.is_admin(),
        };
        if !visible {
            return Err(AppError::Authorization(
                "Alert is not addressed to you".to_string(),
            ));
        }

        self.repository.alerts.mark_read(id).await
    }

    /// Acknowledge every alert visible to the caller
    pub async fn mark_all_read(&self, claims: &UserClaims) -> AppResult<()> {
        self.repository
            .alerts
            .mark_all_read(claims.user_id, claims.is_admin())
            .await
    }
}
