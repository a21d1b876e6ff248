mod chat;
mod error;
mod sessions;
mod sse;
mod stats;

pub use error::ApiError;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use rehearse_core::{ReplyDelay, SessionRegistry};
use rehearse_db::{ConversationStore, Database};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub db: Arc<Database>,
    /// Pause before `/api/chat` answers
    pub api_delay: Duration,
}

impl AppState {
    /// Build the state for a server whose sessions persist under `storage_key`.
    pub fn new(
        db: Arc<Database>,
        storage_key: &str,
        reply_delay: ReplyDelay,
        api_delay: Duration,
    ) -> Self {
        let store = ConversationStore::new(db.clone(), storage_key);
        let registry = SessionRegistry::new(reply_delay).with_sink(Arc::new(store));

        Self {
            registry: Arc::new(registry),
            db,
            api_delay,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat::chat))
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/api/sessions/{id}",
            get(sessions::get_session).delete(sessions::end_session),
        )
        .route(
            "/api/sessions/{id}/messages",
            post(sessions::send_message).delete(sessions::clear_messages),
        )
        .route("/api/sessions/{id}/events", get(sse::session_events))
        .route("/api/stats", get(stats::get_stats))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
