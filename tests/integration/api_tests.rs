//! API integration tests
//!
//! These run against a live server with a seeded database:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to log in and return a bearer token
async fn get_auth_token(client: &Client, email: &str, password: &str) -> String {
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

async fn teacher_token(client: &Client) -> String {
    get_auth_token(client, "teacher@example.edu", "teacher").await
}

async fn student_token(client: &Client) -> String {
    get_auth_token(client, "student@example.edu", "student").await
}

async fn admin_token(client: &Client) -> String {
    get_auth_token(client, "admin@example.edu", "admin").await
}

#[tokio::test]
#[ignore]
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
async fn test_readiness_check() {
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
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "teacher@example.edu",
            "password": "teacher"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "teacher@example.edu",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/events", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

/// Create an event whose check-in window is currently open, check in at
/// its exact coordinates, and verify status flips.
#[tokio::test]
#[ignore]
async fn test_check_in_flow() {
    let client = Client::new();
    let teacher = teacher_token(&client).await;
    let student = student_token(&client).await;

    let now = chrono::Local::now().naive_local();
    let response = client
        .post(format!("{}/events", BASE_URL))
        .header("Authorization", format!("Bearer {}", teacher))
        .json(&json!({
            "name": "Integration Test Event",
            "department_id": null,
            "latitude": 14.5995,
            "longitude": 120.9842,
            "radius": 50.0,
            "start_time": (now - chrono::Duration::hours(1)).format("%Y-%m-%dT%H:%M:%S").to_string(),
            "end_time": (now + chrono::Duration::hours(1)).format("%Y-%m-%dT%H:%M:%S").to_string()
        }))
        .send()
        .await
        .expect("Failed to create event");

    assert_eq!(response.status(), 201);
    let event: Value = response.json().await.expect("Failed to parse event");
    let event_id = event["id"].as_str().expect("No event ID").to_string();

    // Check in at the event's own coordinates
    let response = client
        .post(format!("{}/attendance/checkin", BASE_URL))
        .header("Authorization", format!("Bearer {}", student))
        .json(&json!({
            "event_id": event_id,
            "latitude": 14.5995,
            "longitude": 120.9842
        }))
        .send()
        .await
        .expect("Failed to check in");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "Success");
    assert_eq!(body["attendance"]["status"], "Present");

    // Second check-in must be rejected
    let response = client
        .post(format!("{}/attendance/checkin", BASE_URL))
        .header("Authorization", format!("Bearer {}", student))
        .json(&json!({
            "event_id": event_id,
            "latitude": 14.5995,
            "longitude": 120.9842
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    // Status reflects the check-in
    let response = client
        .get(format!("{}/attendance/status/{}", BASE_URL, event_id))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .expect("Failed to get status");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["has_checked_in"], true);
    assert_eq!(body["has_checked_out"], false);

    // Cleanup
    let _ = client
        .delete(format!("{}/events/{}", BASE_URL, event_id))
        .header("Authorization", format!("Bearer {}", teacher))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_check_in_out_of_range() {
    let client = Client::new();
    let teacher = teacher_token(&client).await;
    let student = student_token(&client).await;

    let now = chrono::Local::now().naive_local();
    let response = client
        .post(format!("{}/events", BASE_URL))
        .header("Authorization", format!("Bearer {}", teacher))
        .json(&json!({
            "name": "Out Of Range Event",
            "department_id": null,
            "latitude": 14.5995,
            "longitude": 120.9842,
            "radius": 50.0,
            "start_time": (now - chrono::Duration::hours(1)).format("%Y-%m-%dT%H:%M:%S").to_string(),
            "end_time": (now + chrono::Duration::hours(1)).format("%Y-%m-%dT%H:%M:%S").to_string()
        }))
        .send()
        .await
        .expect("Failed to create event");

    let event: Value = response.json().await.expect("Failed to parse event");
    let event_id = event["id"].as_str().expect("No event ID").to_string();

    // ~200 m north of the geofence center
    let response = client
        .post(format!("{}/attendance/checkin", BASE_URL))
        .header("Authorization", format!("Bearer {}", student))
        .json(&json!({
            "event_id": event_id,
            "latitude": 14.6013,
            "longitude": 120.9842
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "OutOfRange");

    // Cleanup
    let _ = client
        .delete(format!("{}/events/{}", BASE_URL, event_id))
        .header("Authorization", format!("Bearer {}", teacher))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_checkout_requires_checkin() {
    let client = Client::new();
    let teacher = teacher_token(&client).await;
    let student = student_token(&client).await;

    let now = chrono::Local::now().naive_local();
    let response = client
        .post(format!("{}/events", BASE_URL))
        .header("Authorization", format!("Bearer {}", teacher))
        .json(&json!({
            "name": "Checkout Gate Event",
            "department_id": null,
            "latitude": 14.5995,
            "longitude": 120.9842,
            "radius": 50.0,
            "start_time": (now - chrono::Duration::hours(2)).format("%Y-%m-%dT%H:%M:%S").to_string(),
            "end_time": (now - chrono::Duration::hours(1)).format("%Y-%m-%dT%H:%M:%S").to_string()
        }))
        .send()
        .await
        .expect("Failed to create event");

    let event: Value = response.json().await.expect("Failed to parse event");
    let event_id = event["id"].as_str().expect("No event ID").to_string();

    // Check-out window is open (event ended) but there is no check-in
    let response = client
        .post(format!("{}/attendance/checkout", BASE_URL))
        .header("Authorization", format!("Bearer {}", student))
        .json(&json!({
            "event_id": event_id,
            "latitude": 14.5995,
            "longitude": 120.9842
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "MustCheckInFirst");

    // Cleanup
    let _ = client
        .delete(format!("{}/events/{}", BASE_URL, event_id))
        .header("Authorization", format!("Bearer {}", teacher))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_event_attendance_view_requires_teacher() {
    let client = Client::new();
    let student = student_token(&client).await;

    let response = client
        .get(format!(
            "{}/attendance/event/00000000-0000-0000-0000-000000000000",
            BASE_URL
        ))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_department_lifecycle() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let response = client
        .post(format!("{}/departments", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "name": "Robotics Society (test)" }))
        .send()
        .await
        .expect("Failed to create department");

    assert_eq!(response.status(), 201);
    let department: Value = response.json().await.expect("Failed to parse department");
    let department_id = department["id"].as_str().expect("No department ID").to_string();

    let response = client
        .put(format!("{}/departments/{}", BASE_URL, department_id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "name": "Robotics Society (renamed)" }))
        .send()
        .await
        .expect("Failed to update department");

    assert_eq!(response.status(), 204);

    let response = client
        .delete(format!("{}/departments/{}", BASE_URL, department_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to delete department");

    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_department_update_requires_admin() {
    let client = Client::new();
    let teacher = teacher_token(&client).await;

    let response = client
        .put(format!(
            "{}/departments/00000000-0000-0000-0000-000000000000",
            BASE_URL
        ))
        .header("Authorization", format!("Bearer {}", teacher))
        .json(&json!({ "name": "Hijacked" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_user_listing_requires_admin() {
    let client = Client::new();
    let student = student_token(&client).await;

    let response = client
        .get(format!("{}/admin/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

/// Students can withdraw their own pending enrollment requests.
#[tokio::test]
#[ignore]
async fn test_cancel_pending_enrollment() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let student = student_token(&client).await;

    let response = client
        .post(format!("{}/departments", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "name": "Chess Club (test)" }))
        .send()
        .await
        .expect("Failed to create department");

    let department: Value = response.json().await.expect("Failed to parse department");
    let department_id = department["id"].as_str().expect("No department ID").to_string();

    let response = client
        .post(format!("{}/enrollments", BASE_URL))
        .header("Authorization", format!("Bearer {}", student))
        .json(&json!({ "department_id": department_id }))
        .send()
        .await
        .expect("Failed to request enrollment");

    assert_eq!(response.status(), 201);
    let enrollment: Value = response.json().await.expect("Failed to parse enrollment");
    let enrollment_id = enrollment["id"].as_str().expect("No enrollment ID").to_string();

    let response = client
        .delete(format!("{}/enrollments/{}", BASE_URL, enrollment_id))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .expect("Failed to cancel enrollment");

    assert_eq!(response.status(), 204);

    // Cleanup
    let _ = client
        .delete(format!("{}/departments/{}", BASE_URL, department_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_finalize_unknown_event() {
    let client = Client::new();
    let teacher = teacher_token(&client).await;

    let response = client
        .post(format!(
            "{}/attendance/event/00000000-0000-0000-0000-000000000000/finalize",
            BASE_URL
        ))
        .header("Authorization", format!("Bearer {}", teacher))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
