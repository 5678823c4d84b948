//! API integration tests.
//!
//! These run against a live server with a fresh database that has an admin
//! account `admin@motorpool.local` / `admin123` (register it and promote the
//! row to `role = 'admin'`). Start the server with `cargo run`, then run
//! `cargo test -- --ignored`.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Register (if needed) and log in, returning a bearer token
async fn get_token(client: &Client, email: &str, password: &str) -> String {
    client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "email": email,
            "password": password,
            "full_name": "Test User"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Admin token; assumes the admin account described in the module docs
async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@motorpool.local",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn create_vehicle(client: &Client, admin_token: &str, plate: &str) -> i64 {
    let response = client
        .post(format!("{}/vehicles", BASE_URL))
        .bearer_auth(admin_token)
        .json(&json!({
            "license_plate": plate,
            "brand": "Renault",
            "model": "Kangoo",
            "current_mileage": 0
        }))
        .send()
        .await
        .expect("Failed to create vehicle");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse vehicle");
    body["id"].as_i64().expect("No vehicle id")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@motorpool.local",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_vehicle_registration_requires_admin() {
    let client = Client::new();
    let token = get_token(&client, "driver1@motorpool.local", "password1").await;

    let response = client
        .post(format!("{}/vehicles", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({ "license_plate": "XX-000-XX" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_plate_rejected() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;

    create_vehicle(&client, &admin, "DU-PLI-01").await;

    let response = client
        .post(format!("{}/vehicles", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({ "license_plate": "DU-PLI-01" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

/// End-to-end booking lifecycle: admit, approve, conflicting request
/// rejected, adjacent request admitted, return advances the odometer.
#[tokio::test]
#[ignore]
async fn test_booking_lifecycle() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let user = get_token(&client, "driver2@motorpool.local", "password2").await;

    let vehicle_id = create_vehicle(&client, &admin, "LC-001-AA").await;

    // Book 09:00-11:00 -> pending
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .bearer_auth(&user)
        .json(&json!({
            "vehicle_id": vehicle_id,
            "start_time": "2030-06-01T09:00:00Z",
            "end_time": "2030-06-01T11:00:00Z",
            "objective": "Site visit"
        }))
        .send()
        .await
        .expect("Failed to create booking");
    assert_eq!(response.status(), 201);
    let booking_a: Value = response.json().await.expect("Failed to parse booking");
    assert_eq!(booking_a["status"], "pending");
    let booking_a_id = booking_a["id"].as_i64().expect("No booking id");

    // Approve A
    let response = client
        .put(format!("{}/bookings/{}/status", BASE_URL, booking_a_id))
        .bearer_auth(&admin)
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .expect("Failed to approve booking");
    assert_eq!(response.status(), 200);

    // Overlapping request 10:00-12:00 -> conflict citing A's window
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .bearer_auth(&user)
        .json(&json!({
            "vehicle_id": vehicle_id,
            "start_time": "2030-06-01T10:00:00Z",
            "end_time": "2030-06-01T12:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["details"]["conflict_start"], "2030-06-01T09:00:00Z");

    // Adjacent request 11:00-13:00 -> admissible (half-open windows)
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .bearer_auth(&user)
        .json(&json!({
            "vehicle_id": vehicle_id,
            "start_time": "2030-06-01T11:00:00Z",
            "end_time": "2030-06-01T13:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Return A at 50 km
    let response = client
        .post(format!("{}/bookings/{}/return", BASE_URL, booking_a_id))
        .bearer_auth(&user)
        .json(&json!({ "end_mileage": 50 }))
        .send()
        .await
        .expect("Failed to return vehicle");
    assert_eq!(response.status(), 200);
    let completed: Value = response.json().await.expect("Failed to parse booking");
    assert_eq!(completed["status"], "completed");
    assert_eq!(completed["start_mileage"], 0);
    assert_eq!(completed["end_mileage"], 50);

    // Vehicle odometer advanced
    let response = client
        .get(format!("{}/vehicles/{}", BASE_URL, vehicle_id))
        .bearer_auth(&user)
        .send()
        .await
        .expect("Failed to fetch vehicle");
    let vehicle: Value = response.json().await.expect("Failed to parse vehicle");
    assert_eq!(vehicle["current_mileage"], 50);
}

#[tokio::test]
#[ignore]
async fn test_invalid_interval_rejected() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let vehicle_id = create_vehicle(&client, &admin, "IV-001-AA").await;

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "vehicle_id": vehicle_id,
            "start_time": "2030-06-01T11:00:00Z",
            "end_time": "2030-06-01T09:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_booking_on_maintenance_vehicle_rejected() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let vehicle_id = create_vehicle(&client, &admin, "MT-001-AA").await;

    let response = client
        .put(format!("{}/vehicles/{}/status", BASE_URL, vehicle_id))
        .bearer_auth(&admin)
        .json(&json!({ "status": "maintenance" }))
        .send()
        .await
        .expect("Failed to set status");
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "vehicle_id": vehicle_id,
            "start_time": "2030-06-01T09:00:00Z",
            "end_time": "2030-06-01T11:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_out_of_order_return_rejected() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let vehicle_id = create_vehicle(&client, &admin, "OO-001-AA").await;

    // Two sequential approved bookings
    let mut ids = Vec::new();
    for (start, end) in [
        ("2030-07-01T09:00:00Z", "2030-07-01T11:00:00Z"),
        ("2030-07-02T09:00:00Z", "2030-07-02T11:00:00Z"),
    ] {
        let response = client
            .post(format!("{}/bookings", BASE_URL))
            .bearer_auth(&admin)
            .json(&json!({
                "vehicle_id": vehicle_id,
                "start_time": start,
                "end_time": end
            }))
            .send()
            .await
            .expect("Failed to create booking");
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.expect("Failed to parse booking");
        let id = body["id"].as_i64().expect("No booking id");

        let response = client
            .put(format!("{}/bookings/{}/status", BASE_URL, id))
            .bearer_auth(&admin)
            .json(&json!({ "status": "approved" }))
            .send()
            .await
            .expect("Failed to approve booking");
        assert_eq!(response.status(), 200);
        ids.push(id);
    }

    // Returning the second while the first is still open must fail
    let response = client
        .post(format!("{}/bookings/{}/return", BASE_URL, ids[1]))
        .bearer_auth(&admin)
        .json(&json!({ "end_mileage": 100 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    // First returns fine, then the second
    let response = client
        .post(format!("{}/bookings/{}/return", BASE_URL, ids[0]))
        .bearer_auth(&admin)
        .json(&json!({ "end_mileage": 60 }))
        .send()
        .await
        .expect("Failed to return vehicle");
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/bookings/{}/return", BASE_URL, ids[1]))
        .bearer_auth(&admin)
        .json(&json!({ "end_mileage": 120 }))
        .send()
        .await
        .expect("Failed to return vehicle");
    assert_eq!(response.status(), 200);
    let completed: Value = response.json().await.expect("Failed to parse booking");
    // Hand-off from the first return
    assert_eq!(completed["start_mileage"], 60);
}

#[tokio::test]
#[ignore]
async fn test_mileage_regression_rejected() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let vehicle_id = create_vehicle(&client, &admin, "MR-001-AA").await;

    let response = client
        .put(format!("{}/vehicles/{}/mileage", BASE_URL, vehicle_id))
        .bearer_auth(&admin)
        .json(&json!({ "mileage": 5000 }))
        .send()
        .await
        .expect("Failed to update mileage");
    assert_eq!(response.status(), 200);

    let response = client
        .put(format!("{}/vehicles/{}/mileage", BASE_URL, vehicle_id))
        .bearer_auth(&admin)
        .json(&json!({ "mileage": 4000 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_cancel_pending_booking() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let user = get_token(&client, "driver3@motorpool.local", "password3").await;
    let vehicle_id = create_vehicle(&client, &admin, "CN-001-AA").await;

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .bearer_auth(&user)
        .json(&json!({
            "vehicle_id": vehicle_id,
            "start_time": "2030-08-01T09:00:00Z",
            "end_time": "2030-08-01T11:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to create booking");
    let body: Value = response.json().await.expect("Failed to parse booking");
    let id = body["id"].as_i64().expect("No booking id");

    let response = client
        .post(format!("{}/bookings/{}/cancel", BASE_URL, id))
        .bearer_auth(&user)
        .send()
        .await
        .expect("Failed to cancel booking");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse booking");
    assert_eq!(body["status"], "cancelled");

    // Terminal: cannot cancel twice
    let response = client
        .post(format!("{}/bookings/{}/cancel", BASE_URL, id))
        .bearer_auth(&user)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_readiness_probe() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_delete_vehicle_with_alerts_only() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let vehicle_id = create_vehicle(&client, &admin, "AL-001-AA").await;

    // Mileage correction past the service interval raises a maintenance
    // alert carrying the vehicle id; no booking references the vehicle.
    let response = client
        .put(format!("{}/vehicles/{}/mileage", BASE_URL, vehicle_id))
        .bearer_auth(&admin)
        .json(&json!({ "mileage": 15000 }))
        .send()
        .await
        .expect("Failed to update mileage");
    assert_eq!(response.status(), 200);

    let response = client
        .delete(format!("{}/vehicles/{}", BASE_URL, vehicle_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to delete vehicle");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_completed_booking_cannot_be_overwritten() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let vehicle_id = create_vehicle(&client, &admin, "CB-001-AA").await;

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "vehicle_id": vehicle_id,
            "start_time": "2030-10-01T09:00:00Z",
            "end_time": "2030-10-01T11:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to create booking");
    let body: Value = response.json().await.expect("Failed to parse booking");
    let id = body["id"].as_i64().expect("No booking id");

    let response = client
        .put(format!("{}/bookings/{}/status", BASE_URL, id))
        .bearer_auth(&admin)
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .expect("Failed to approve booking");
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/bookings/{}/return", BASE_URL, id))
        .bearer_auth(&admin)
        .json(&json!({ "end_mileage": 30 }))
        .send()
        .await
        .expect("Failed to return vehicle");
    assert_eq!(response.status(), 200);

    // Neither rejection nor cancellation may touch the completed booking
    let response = client
        .put(format!("{}/bookings/{}/status", BASE_URL, id))
        .bearer_auth(&admin)
        .json(&json!({ "status": "rejected" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    let response = client
        .post(format!("{}/bookings/{}/cancel", BASE_URL, id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    let response = client
        .get(format!("{}/bookings/{}", BASE_URL, id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to fetch booking");
    let body: Value = response.json().await.expect("Failed to parse booking");
    assert_eq!(body["status"], "completed");
}

#[tokio::test]
#[ignore]
async fn test_overdue_booking_listed_until_returned() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let vehicle_id = create_vehicle(&client, &admin, "OV-001-AA").await;

    // A window entirely in the past is admissible; once approved it is
    // immediately overdue.
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "vehicle_id": vehicle_id,
            "start_time": "2020-01-01T09:00:00Z",
            "end_time": "2020-01-01T11:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to create booking");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse booking");
    let id = body["id"].as_i64().expect("No booking id");

    let response = client
        .put(format!("{}/bookings/{}/status", BASE_URL, id))
        .bearer_auth(&admin)
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .expect("Failed to approve booking");
    assert_eq!(response.status(), 200);

    let is_listed = |body: &Value| {
        body.as_array()
            .expect("Expected an array")
            .iter()
            .any(|b| b["id"] == id)
    };

    let response = client
        .get(format!("{}/bookings/overdue", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to list overdue bookings");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(is_listed(&body));

    // Still reported on a repeat scan while unreturned
    let response = client
        .get(format!("{}/bookings/overdue", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to list overdue bookings");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(is_listed(&body));

    // Returning the vehicle clears it from the scan
    let response = client
        .post(format!("{}/bookings/{}/return", BASE_URL, id))
        .bearer_auth(&admin)
        .json(&json!({ "end_mileage": 40 }))
        .send()
        .await
        .expect("Failed to return vehicle");
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{}/bookings/overdue", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to list overdue bookings");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(!is_listed(&body));
}

#[tokio::test]
#[ignore]
async fn test_user_cannot_see_others_booking() {
    let client = Client::new();
    let admin = get_admin_token(&client).await;
    let user_a = get_token(&client, "driver4@motorpool.local", "password4").await;
    let user_b = get_token(&client, "driver5@motorpool.local", "password5").await;
    let vehicle_id = create_vehicle(&client, &admin, "PR-001-AA").await;

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .bearer_auth(&user_a)
        .json(&json!({
            "vehicle_id": vehicle_id,
            "start_time": "2030-09-01T09:00:00Z",
            "end_time": "2030-09-01T11:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to create booking");
    let body: Value = response.json().await.expect("Failed to parse booking");
    let id = body["id"].as_i64().expect("No booking id");

    let response = client
        .get(format!("{}/bookings/{}", BASE_URL, id))
        .bearer_auth(&user_b)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}
