mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;
use lifeline_domain::testing::ScriptedModel;

#[tokio::test]
async fn test_chat_memory_grows_and_clears() {
    let model = ScriptedModel::new()
        .with_reply(r#"{"action": "fetch_appointments", "action_input": "upcoming"}"#)
        .with_reply(r#"{"action": "Final Answer", "action_input": "You see Dr. Rao on 12 September."}"#)
        .with_reply(r#"{"action": "Final Answer", "action_input": "Fortis hospital."}"#);
    let app = TestApp::with_model(model);
    let token = app.login_as("lee@example.com").await;

    app.call(
        Method::POST,
        "/api/appointments",
        Some(&token),
        Some(json!({
            "doctor_name": "Dr. Rao",
            "hospital_name": "Fortis",
            "appointment_date": "2024-09-12"
        })),
    )
    .await;

    let (status, body) = app
        .call(Method::POST, "/agent/chat?query=When%20is%20my%20next%20appointment", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "You see Dr. Rao on 12 September.");
    assert_eq!(body["memory_items"], 2);

    let requests = app.model.requests();
    assert!(requests[1].last_text().contains("Dr. Rao"));
    assert_eq!(requests[1].temperature, Some(0.0));

    let (_, body) = app
        .call(Method::POST, "/agent/chat?query=Which%20hospital", Some(&token), None)
        .await;
    assert_eq!(body["memory_items"], 4);

    let (status, body) = app.call(Method::POST, "/agent/chat/clear", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared"], true);
}

#[tokio::test]
async fn test_chat_failure_is_agent_error() {
    let app = TestApp::with_model(ScriptedModel::new().with_failure("model overloaded"));
    let token = app.login_as("lee@example.com").await;

    let (status, body) = app
        .call(Method::POST, "/agent/chat?query=hello", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().starts_with("Agent error:"));

    let (status, _) = app.call(Method::POST, "/agent/chat", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_timeline_analysis() {
    let app = TestApp::with_model(ScriptedModel::new().with_reply("Cholesterol is trending down."));
    let token = app.login_as("ana@example.com").await;

    app.call(
        Method::POST,
        "/api/medicines",
        Some(&token),
        Some(json!({ "name": "Atorvastatin", "dosage": "10mg" })),
    )
    .await;

    let (status, body) = app.call(Method::POST, "/agent/timeline", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"], "Cholesterol is trending down.");

    let prompt = app.model.requests()[0].last_text().to_string();
    assert!(prompt.starts_with("Analyze this patient's complete medical timeline and give insights"));
    assert!(prompt.contains("Atorvastatin"));
    assert!(prompt.contains("Appointments: []"));
}

#[tokio::test]
async fn test_suggest_doctor() {
    let model = ScriptedModel::new()
        .with_reply("```json\n{\"specialties\": [\"Neurologist\"], \"urgency\": \"medium\"}\n```")
        .with_reply("Consider seeing a general physician.")
        .with_failure("timeout");
    let app = TestApp::with_model(model);
    let token = app.login_as("ben@example.com").await;

    let (status, body) = app
        .call(Method::POST, "/agent/suggest-doctor?symptoms=migraine", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestion"]["specialties"][0], "Neurologist");

    let (_, body) = app
        .call(Method::POST, "/agent/suggest-doctor?symptoms=fatigue", Some(&token), None)
        .await;
    assert_eq!(body["suggestion"]["raw"], "Consider seeing a general physician.");

    let (status, body) = app
        .call(Method::POST, "/agent/suggest-doctor?symptoms=cough", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().starts_with("Gemini request failed:"));
}
