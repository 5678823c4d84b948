//! Motorpool Fleet Booking System
//!
//! A Rust implementation of the Motorpool vehicle fleet server, providing a
//! REST JSON API for booking admission, the approval workflow, vehicle
//! returns and fleet lifecycle monitoring.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod scheduler;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
