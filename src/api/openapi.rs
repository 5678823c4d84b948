//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{alerts, auth, bookings, health, stats, users, vehicles};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Motorpool API",
        version = "1.0.0",
        description = "Vehicle fleet booking and lifecycle REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        auth::update_profile,
        auth::forgot_password,
        // Vehicles
        vehicles::list_vehicles,
        vehicles::get_vehicle,
        vehicles::create_vehicle,
        vehicles::update_vehicle,
        vehicles::update_mileage,
        vehicles::mark_serviced,
        vehicles::set_status,
        vehicles::delete_vehicle,
        // Bookings
        bookings::create_booking,
        bookings::list_bookings,
        bookings::get_booking,
        bookings::set_status,
        bookings::return_vehicle,
        bookings::cancel_booking,
        bookings::available_vehicles,
        bookings::list_overdue,
        // Alerts
        alerts::list_alerts,
        alerts::unread_count,
        alerts::mark_read,
        alerts::mark_all_read,
        // Users
        users::list_users,
        users::update_user,
        users::delete_user,
        // Reports
        stats::fleet_stats,
    ),
    components(
        schemas(
            // Auth
            auth::MessageResponse,
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::UpdateProfile,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::ForgotPasswordRequest,
            crate::models::enums::Role,
            // Vehicles
            crate::models::vehicle::Vehicle,
            crate::models::vehicle::CreateVehicle,
            crate::models::vehicle::UpdateVehicle,
            crate::models::vehicle::UpdateMileage,
            crate::models::vehicle::UpdateVehicleStatus,
            crate::models::enums::VehicleStatus,
            // Bookings
            crate::models::booking::Booking,
            crate::models::booking::BookingDetails,
            crate::models::booking::CreateBooking,
            crate::models::booking::OverdueBooking,
            crate::models::enums::BookingStatus,
            bookings::SetStatusRequest,
            bookings::ReturnRequest,
            // Alerts
            crate::models::alert::Alert,
            crate::models::enums::AlertKind,
            alerts::UnreadCountResponse,
            // Reports
            crate::services::stats::FleetStats,
            crate::services::stats::VehicleUsage,
            crate::services::stats::MonthlyBookings,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "vehicles", description = "Vehicle registry"),
        (name = "bookings", description = "Booking ledger"),
        (name = "alerts", description = "Alert feed"),
        (name = "users", description = "User administration"),
        (name = "reports", description = "Fleet reports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
