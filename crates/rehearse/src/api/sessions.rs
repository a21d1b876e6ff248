use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use rehearse_core::Message;
use rehearse_db::PracticeRecord;
use rehearse_persona::{ClientProfile, ProfileDraft};

use super::{ApiError, AppState};

const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSession {
    pub session_id: String,
    pub profile: ClientProfile,
    pub messages: Vec<Message>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub profile: ClientProfile,
    pub header: String,
    pub messages: Vec<Message>,
    pub is_typing: bool,
}

#[derive(Debug, Deserialize)]
pub struct SendMessage {
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize)]
pub struct Reply {
    pub message: Message,
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PracticeRecord>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let records = state
        .db
        .practice()
        .list(limit)
        .map_err(ApiError::database)?;

    Ok(Json(records))
}

pub async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<ProfileDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedSession>), ApiError> {
    let Json(draft) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let session = state.registry.create(&draft)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedSession {
            session_id: session.id().to_string(),
            profile: session.profile().clone(),
            messages: session.messages(),
        }),
    ))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.registry.get(&id)?;

    Ok(Json(SessionView {
        session_id: session.id().to_string(),
        header: session.profile().header(),
        profile: session.profile().clone(),
        messages: session.messages(),
        is_typing: session.is_typing(),
    }))
}

/// Submit a trainee message; answers with the client's reply once the
/// reply delay has passed.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SendMessage>, JsonRejection>,
) -> Result<Json<Reply>, ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let session = state.registry.get(&id)?;

    let message = session
        .submit(&body.content)
        .await
        .ok_or_else(|| ApiError::bad_request("Message content is required"))?;

    Ok(Json(Reply { message }))
}

pub async fn clear_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.registry.get(&id)?.clear();
    Ok(StatusCode::NO_CONTENT)
}

/// Drop a live session. Its persisted log and history row are kept.
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.registry.remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
