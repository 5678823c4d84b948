//! Outbound notification dispatch.
//!
//! Mutating operations enqueue fully-rendered messages after their
//! transaction commits; a single worker task drains the channel and hands
//! the messages to SMTP. Delivery failures are logged and swallowed, never
//! surfaced to the caller.

use tokio::sync::mpsc;

use crate::{
    config::EmailConfig,
    models::{
        booking::{Booking, OverdueBooking},
        user::User,
        vehicle::Vehicle,
    },
    services::email::EmailService,
};

#[derive(Debug)]
struct OutboundMail {
    to: String,
    subject: String,
    body: String,
}

#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<OutboundMail>,
    admin_email: Option<String>,
    enabled: bool,
}

impl Notifier {
    /// Create the notifier and spawn its delivery worker
    pub fn spawn(email: EmailService, config: &EmailConfig) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<OutboundMail>();

        tokio::spawn(async move {
            while let Some(mail) = rx.recv().await {
                let email = email.clone();
                // SMTP transport is blocking
                let result = tokio::task::spawn_blocking(move || {
                    email.send(&mail.to, &mail.subject, &mail.body)
                })
                .await;

                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::warn!("Failed to deliver notification email: {}", e),
                    Err(e) => tracing::warn!("Notification worker task failed: {}", e),
                }
            }
        });

        Self {
            tx,
            admin_email: config.admin_email.clone(),
            enabled: config.enabled,
        }
    }

    fn enqueue(&self, to: &str, subject: String, body: String) {
        if !self.enabled {
            tracing::debug!("Email notifications disabled, dropping: {}", subject);
            return;
        }
        let mail = OutboundMail {
            to: to.to_string(),
            subject,
            body,
        };
        if self.tx.send(mail).is_err() {
            tracing::warn!("Notification worker is gone, dropping email");
        }
    }

    fn enqueue_admin(&self, subject: String, body: String) {
        match &self.admin_email {
            Some(addr) => self.enqueue(addr, subject, body),
            None => tracing::debug!("No admin email configured, dropping: {}", subject),
        }
    }

    /// Tell the approver about a freshly admitted booking request
    pub fn booking_created(&self, booking: &Booking, requester: &User, vehicle: &Vehicle) {
        let subject = format!("New Vehicle Reservation: {}", vehicle.label());
        let body = format!(
            "A new vehicle reservation has been created.\n\n\
             User: {}\n\
             Vehicle: {}\n\
             Start: {}\n\
             End: {}\n\
             Objective: {}\n\
             Destination: {}\n\n\
             Please review the request in the admin panel.",
            requester.full_name.as_deref().unwrap_or(&requester.email),
            vehicle.label(),
            booking.start_time.format("%Y-%m-%d %H:%M"),
            booking.end_time.format("%Y-%m-%d %H:%M"),
            booking.objective.as_deref().unwrap_or("-"),
            booking.destination.as_deref().unwrap_or("-"),
        );
        self.enqueue_admin(subject, body);
    }

    /// Tell the booking owner about a status change
    pub fn booking_status_changed(&self, booking: &Booking, owner: &User, vehicle: &Vehicle) {
        let subject = format!("Booking {}: {}", booking.status, vehicle.label());
        let body = format!(
            "Hello {},\n\n\
             Your vehicle reservation has been updated.\n\n\
             Booking ID: {}\n\
             Vehicle: {}\n\
             Period: {} - {}\n\
             Status: {}\n\n\
             Please log in to the system for more details.",
            owner.full_name.as_deref().unwrap_or(&owner.email),
            booking.id,
            vehicle.label(),
            booking.start_time.format("%Y-%m-%d %H:%M"),
            booking.end_time.format("%Y-%m-%d %H:%M"),
            booking.status,
        );
        self.enqueue(&owner.email, subject, body);
    }

    /// Daily overdue-returns summary for the approver
    pub fn overdue_summary(&self, overdue: &[OverdueBooking]) {
        if overdue.is_empty() {
            return;
        }
        let subject = format!("Daily Check: {} Overdue Vehicle Returns", overdue.len());
        let mut body = String::from(
            "The following vehicles have not been returned by their scheduled end time:\n\n",
        );
        for entry in overdue {
            body.push_str(&format!(
                "- {} {} {} | {} | due {}\n",
                entry.license_plate,
                entry.brand.as_deref().unwrap_or(""),
                entry.model.as_deref().unwrap_or(""),
                entry.user_name.as_deref().unwrap_or("Unknown"),
                entry.end_time.format("%Y-%m-%d %H:%M"),
            ));
        }
        body.push_str("\nPlease follow up with the users to confirm vehicle status.");
        self.enqueue_admin(subject, body);
    }

    /// Maintenance-due alert for the approver
    pub fn maintenance_due(&self, vehicle: &Vehicle, interval_km: i32) {
        let subject = format!("Maintenance Due: {}", vehicle.label());
        let body = format!(
            "The vehicle {} has reached {} km.\n\
             Last maintenance was recorded at {} km; it is now due for its {} km service.\n\n\
             Please mark the vehicle as serviced once the work is complete.",
            vehicle.label(),
            vehicle.current_mileage,
            vehicle.last_maintenance_mileage,
            interval_km,
        );
        self.enqueue_admin(subject, body);
    }

    /// Temporary password for account recovery
    pub fn temp_password(&self, to: &str, temp_password: &str) {
        let subject = "Your Temporary Password - Motorpool".to_string();
        let body = format!(
            "You have requested a new password for your Motorpool account.\n\n\
             Your temporary password is: {}\n\n\
             Please log in and change your password immediately in the profile section.\n\
             If you did not request this, please contact the administrator.",
            temp_password,
        );
        self.enqueue(to, subject, body);
    }
}
