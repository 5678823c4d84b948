//! Data models for Motorpool

pub mod alert;
pub mod booking;
pub mod enums;
pub mod user;
pub mod vehicle;

// Re-export commonly used types
pub use alert::Alert;
pub use booking::{Booking, BookingDetails};
pub use enums::{AlertKind, BookingStatus, Role, VehicleStatus};
pub use user::User;
pub use vehicle::Vehicle;
