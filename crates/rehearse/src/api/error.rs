use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use rehearse_core::SessionError;
use rehearse_persona::FieldError;

/// Error rendered as `{"error": ...}`, plus the offending form fields when
/// a profile was rejected.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    fields: Vec<FieldError>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Log a storage failure and hide its details from the caller.
    pub fn database(err: impl std::fmt::Display) -> Self {
        tracing::error!(error = %err, "Database error");
        Self::internal("Failed to load practice history")
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            SessionError::InvalidProfile(e) => Self {
                status: StatusCode::BAD_REQUEST,
                message: "Invalid client parameters".to_string(),
                fields: e.fields().to_vec(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            fields: (!self.fields.is_empty()).then_some(self.fields.as_slice()),
        };
        (self.status, Json(body)).into_response()
    }
}
