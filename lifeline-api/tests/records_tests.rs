mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn test_medicine_crud() {
    let app = TestApp::new();
    let token = app.login_as("dev@example.com").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/medicines",
            Some(&token),
            Some(json!({ "name": "Metformin", "dosage": "500mg", "frequency": "twice daily" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .call(Method::GET, &format!("/api/medicines/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Metformin");

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/api/medicines/{}", id),
            Some(&token),
            Some(json!({ "dosage": "1000mg" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dosage"], "1000mg");
    assert_eq!(body["data"]["frequency"], "twice daily");

    let (status, body) = app.call(Method::GET, "/api/medicines", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .call(Method::DELETE, &format!("/api/medicines/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, body) = app
        .call(Method::GET, &format!("/api/medicines/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Medicine not found");
}

#[tokio::test]
async fn test_rows_are_isolated_between_users() {
    let app = TestApp::new();
    let alice = app.login_as("alice@example.com").await;
    let bob = app.login_as("bob@example.com").await;

    let (_, body) = app
        .call(
            Method::POST,
            "/api/health-records",
            Some(&alice),
            Some(json!({ "record_type": "allergy", "description": "Penicillin" })),
        )
        .await;
    let id = body["data"]["id"].as_i64().unwrap();
    let item = format!("/api/health-records/{}", id);

    let (status, body) = app.call(Method::GET, &item, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Record not found");

    let (status, body) = app
        .call(Method::PATCH, &item, Some(&bob), Some(json!({ "description": "None" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Record not found or not yours");

    // Deleting someone else's row reports success but removes nothing
    let (status, _) = app.call(Method::DELETE, &item, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.call(Method::GET, "/api/health-records", Some(&bob), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = app.call(Method::GET, &item, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Penicillin");
}

#[tokio::test]
async fn test_defaults_and_validation() {
    let app = TestApp::new();
    let token = app.login_as("nia@example.com").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/appointments",
            Some(&token),
            Some(json!({
                "doctor_name": "Dr. Rao",
                "hospital_name": "Fortis",
                "appointment_date": "2024-09-12T10:30:00"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pending");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/api/appointments/{}", id),
            Some(&token),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No fields to update");

    let (status, body) = app
        .call(Method::POST, "/api/blood-requests", Some(&token), Some(json!({ "blood_group": "O-" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, _) = app.call(Method::GET, "/api/appointments/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_emergencies_list_newest_first() {
    let app = TestApp::new();
    let token = app.login_as("zoe@example.com").await;

    for location in ["Home", "Office"] {
        let (status, body) = app
            .call(Method::POST, "/api/emergencies", Some(&token), Some(json!({ "location": location })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "active");
    }

    let (_, body) = app.call(Method::GET, "/api/emergencies", Some(&token), None).await;
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0]["triggered_at"].as_str() >= rows[1]["triggered_at"].as_str());
}
