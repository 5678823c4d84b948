//! Motorpool Server - Vehicle Fleet Booking System
//!
//! A Rust REST API server for fleet booking and lifecycle management.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use motorpool_server::{
    api, config::AppConfig, repository::Repository, scheduler, services::Services, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("motorpool_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Motorpool Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        config.auth.clone(),
        config.email.clone(),
        config.maintenance.clone(),
    );

    // Start the daily lifecycle check
    scheduler::spawn_daily_check(
        services.monitor.clone(),
        config.maintenance.daily_check_hour,
    );

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/profile", put(api::auth::update_profile))
        .route("/auth/forgot-password", post(api::auth::forgot_password))
        // Vehicles
        .route("/vehicles", get(api::vehicles::list_vehicles))
        .route("/vehicles", post(api::vehicles::create_vehicle))
        .route("/vehicles/:id", get(api::vehicles::get_vehicle))
        .route("/vehicles/:id", put(api::vehicles::update_vehicle))
        .route("/vehicles/:id", delete(api::vehicles::delete_vehicle))
        .route("/vehicles/:id/mileage", put(api::vehicles::update_mileage))
        .route("/vehicles/:id/service", post(api::vehicles::mark_serviced))
        .route("/vehicles/:id/status", put(api::vehicles::set_status))
        // Bookings
        .route("/bookings", post(api::bookings::create_booking))
        .route("/bookings", get(api::bookings::list_bookings))
        .route(
            "/bookings/available-vehicles",
            get(api::bookings::available_vehicles),
        )
        .route("/bookings/overdue", get(api::bookings::list_overdue))
        .route("/bookings/:id", get(api::bookings::get_booking))
        .route("/bookings/:id/status", put(api::bookings::set_status))
        .route("/bookings/:id/return", post(api::bookings::return_vehicle))
        .route("/bookings/:id/cancel", post(api::bookings::cancel_booking))
        // Alerts
        .route("/alerts", get(api::alerts::list_alerts))
        .route("/alerts/unread-count", get(api::alerts::unread_count))
        .route("/alerts/read-all", put(api::alerts::mark_all_read))
        .route("/alerts/:id/read", put(api::alerts::mark_read))
        // Users
        .route("/users", get(api::users::list_users))
        .route("/users/:id", put(api::users::update_user))
        .route("/users/:id", delete(api::users::delete_user))
        // Reports
        .route("/reports/stats", get(api::stats::fleet_stats))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
