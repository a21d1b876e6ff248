use axum::body::Bytes;
use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use serde_json::Value;

use rehearse_persona::{respond, ClientProfile};

use super::{ApiError, AppState};

const MISSING_FIELDS: &str = "Message and client parameters are required";
const PROCESSING_FAILED: &str = "Failed to process chat message";

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// One-shot reply for `{message, clientParams}`.
///
/// A falsy message or falsy client parameters (missing, null, false, zero or
/// empty string) is a client error; anything else that goes wrong, including
/// a message that is not a string, is reported as a generic 500.
pub async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let request: Value = serde_json::from_slice(&body).map_err(processing_failed)?;

    let message = request.get("message");
    let params = request.get("clientParams");
    let (Some(message), Some(params)) = (truthy(message), truthy(params)) else {
        return Err(ApiError::bad_request(MISSING_FIELDS));
    };

    let Some(message) = message.as_str() else {
        tracing::error!("Chat message is not a string");
        return Err(ApiError::internal(PROCESSING_FAILED));
    };

    let profile: ClientProfile =
        serde_json::from_value(params.clone()).map_err(processing_failed)?;

    if !state.api_delay.is_zero() {
        tokio::time::sleep(state.api_delay).await;
    }

    let response = respond(message, &profile);
    tracing::debug!(client = %profile.client_name, "Chat reply generated");

    Ok(Json(ChatResponse { response }))
}

fn processing_failed(err: serde_json::Error) -> ApiError {
    tracing::error!(error = %err, "Error processing chat message");
    ApiError::internal(PROCESSING_FAILED)
}

fn truthy(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}
