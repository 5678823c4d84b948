//! Alert model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::AlertKind;

/// Alert event record.
///
/// Immutable once created, except for the read flag. `user_id` NULL means
/// the alert is broadcast to all approvers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Alert {
    pub id: i32,
    pub user_id: Option<i32>,
    pub vehicle_id: Option<i32>,
    pub title: String,
    pub message: String,
    pub kind: AlertKind,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new alert
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub user_id: Option<i32>,
    pub vehicle_id: Option<i32>,
    pub title: String,
    pub message: String,
    pub kind: AlertKind,
}
