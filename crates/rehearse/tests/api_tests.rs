use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use rehearse::api::{create_router, AppState};
use rehearse_core::ReplyDelay;
use rehearse_db::{Database, DEFAULT_STORAGE_KEY};

fn app() -> (Router, Arc<Database>) {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let state = AppState::new(
        db.clone(),
        DEFAULT_STORAGE_KEY,
        ReplyDelay::None,
        Duration::ZERO,
    );
    (create_router(state), db)
}

fn client_params(urgency: u8) -> Value {
    json!({
        "clientName": "Sarah Johnson",
        "clientType": "first-time-buyer",
        "budgetMin": 300000,
        "budgetMax": 450000,
        "urgencyLevel": urgency,
        "personalityTraits": ["analytical", "cautious"],
        "propertyPreferences": "a 3-bedroom house near good schools",
        "specialRequirements": ""
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_session(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/sessions", Some(client_params(9))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["sessionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_chat_timeline_for_urgent_client() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/chat",
        Some(json!({ "message": "What's the timeline?", "clientParams": client_params(9) })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["response"].as_str().unwrap().contains("next month"));
}

#[tokio::test]
async fn test_chat_budget_reply() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/chat",
        Some(json!({ "message": "What BUDGET are you working with?", "clientParams": client_params(5) })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response = body["response"].as_str().unwrap();
    assert!(response.contains("$300,000"));
    assert!(response.contains("$450,000"));
}

#[tokio::test]
async fn test_chat_missing_fields() {
    let (app, _) = app();
    let expected = json!({ "error": "Message and client parameters are required" });

    for body in [
        json!({ "clientParams": client_params(5) }),
        json!({ "message": "", "clientParams": client_params(5) }),
        json!({ "message": "hello" }),
        json!({ "message": "hello", "clientParams": null }),
        json!({ "message": "hello", "clientParams": false }),
        json!({ "message": "hello", "clientParams": 0 }),
        json!({ "message": 0, "clientParams": client_params(5) }),
        json!({ "message": false, "clientParams": client_params(5) }),
    ] {
        let (status, response) = send(&app, "POST", "/api/chat", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, expected);
    }
}

#[tokio::test]
async fn test_chat_processing_failure_is_generic() {
    let (app, _) = app();
    let expected = json!({ "error": "Failed to process chat message" });

    let (status, response) = send(
        &app,
        "POST",
        "/api/chat",
        Some(json!({ "message": "hello", "clientParams": { "clientName": "Pat" } })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response, expected);

    // Present but not text
    let (status, response) = send(
        &app,
        "POST",
        "/api/chat",
        Some(json!({ "message": 42, "clientParams": client_params(5) })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response, expected);

    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test(start_paused = true)]
async fn test_chat_applies_api_delay() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let state = AppState::new(
        db,
        DEFAULT_STORAGE_KEY,
        ReplyDelay::None,
        Duration::from_millis(1000),
    );
    let app = create_router(state);

    let started = tokio::time::Instant::now();
    let (status, _) = send(
        &app,
        "POST",
        "/api/chat",
        Some(json!({ "message": "hi", "clientParams": client_params(5) })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test]
async fn test_create_session_greets() {
    let (app, _) = app();
    let (status, body) = send(&app, "POST", "/api/sessions", Some(client_params(9))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["sessionId"].as_str().unwrap().is_empty());
    assert_eq!(body["profile"]["clientName"], "Sarah Johnson");

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "assistant");
}

#[tokio::test]
async fn test_create_session_reports_every_invalid_field() {
    let (app, _) = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/sessions",
        Some(json!({ "clientName": "S", "budgetMin": 10000, "personalityTraits": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"clientName"));
    assert!(fields.contains(&"clientType"));
    assert!(fields.contains(&"budgetMin"));
    assert!(fields.contains(&"personalityTraits"));
}

#[tokio::test]
async fn test_conversation_flow() {
    let (app, db) = app();
    let id = create_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/messages", id),
        Some(json!({ "content": "When do you need to move?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"]["role"], "assistant");
    assert!(body["message"]["content"]
        .as_str()
        .unwrap()
        .contains("next month"));

    let (status, body) = send(&app, "GET", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isTyping"], false);
    assert_eq!(
        body["header"],
        "Budget: $300,000 - $450,000 • Urgency: 9/10"
    );
    let roles: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["assistant", "user", "assistant"]);

    // The log is persisted under the storage key
    let stored = db
        .conversations()
        .list(DEFAULT_STORAGE_KEY, &id)
        .unwrap();
    assert_eq!(stored.len(), 3);
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let (app, _) = app();
    let id = create_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/messages", id),
        Some(json!({ "content": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, body) = send(&app, "GET", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_clear_messages() {
    let (app, _) = app();
    let id = create_session(&app).await;

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{}/messages", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", &format!("/api/sessions/{}", id), None).await;
    assert!(body["messages"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_end_session() {
    let (app, db) = app();
    let id = create_session(&app).await;

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // History outlives the live session
    assert_eq!(db.practice().list(10).unwrap().len(), 1);
    assert_eq!(
        db.conversations().count(DEFAULT_STORAGE_KEY, &id).unwrap(),
        1
    );
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (app, _) = app();

    let (status, body) = send(&app, "GET", "/api/sessions/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        "POST",
        "/api/sessions/missing/messages",
        Some(json!({ "content": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_and_stats() {
    let (app, _) = app();
    let first = create_session(&app).await;
    create_session(&app).await;

    send(
        &app,
        "POST",
        &format!("/api/sessions/{}/messages", first),
        Some(json!({ "content": "What's your budget?" })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["clientType"], "First Time Buyer");

    let (status, body) = send(&app, "GET", "/api/sessions?limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/api/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalSessions"], 2);
    // Two greetings, one question and its reply
    assert_eq!(body["totalMessages"], 4);
    assert_eq!(body["clientTypesPracticed"], 1);
}

#[tokio::test]
async fn test_events_stream_for_known_session() {
    let (app, _) = app();
    let id = create_session(&app).await;

    let request = Request::builder()
        .uri(format!("/api/sessions/{}/events", id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/event-stream"
    );

    let (status, _) = send(&app, "GET", "/api/sessions/missing/events", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
