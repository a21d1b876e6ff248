use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rehearse_persona::{greeting, respond, ClientProfile};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::conversation::{ConversationLog, Message, Role};
use crate::delay::ReplyDelay;
use crate::events::SessionEvent;

pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Identifying details of a practice session, without the full profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub id: String,
    pub client_name: String,
    pub client_type: String,
    pub budget_label: String,
    pub started_at: DateTime<Utc>,
}

/// Receives every change made to a session's conversation log.
///
/// Failures are logged and otherwise ignored: the in-memory log stays the
/// source of truth for the running session.
pub trait ConversationSink: Send + Sync {
    fn session_started(&self, _info: &SessionInfo) -> Result<(), SinkError> {
        Ok(())
    }

    fn message_appended(&self, session_id: &str, message: &Message) -> Result<(), SinkError>;

    fn cleared(&self, session_id: &str) -> Result<(), SinkError>;
}

/// One trainee conversing with one virtual client.
///
/// Owns the write-once profile and the append-only log. Replies come from the
/// rule engine immediately; only their appearance in the log is delayed.
pub struct PracticeSession {
    id: String,
    profile: ClientProfile,
    log: Mutex<ConversationLog>,
    pending_replies: AtomicUsize,
    delay: ReplyDelay,
    sink: Option<Arc<dyn ConversationSink>>,
    events: broadcast::Sender<SessionEvent>,
    started_at: DateTime<Utc>,
}

impl PracticeSession {
    pub fn new(profile: ClientProfile, delay: ReplyDelay) -> Self {
        let (events, _) = broadcast::channel(256);
        let id = if profile.id.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            profile.id.clone()
        };

        Self {
            id,
            profile,
            log: Mutex::new(ConversationLog::new()),
            pending_replies: AtomicUsize::new(0),
            delay,
            sink: None,
            events,
            started_at: Utc::now(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ConversationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Announce the session to the sink and greet the trainee if the log is empty.
    pub fn start(&self) {
        info!(
            session_id = %self.id,
            client = %self.profile.client_name,
            client_type = %self.profile.client_type,
            "Practice session started"
        );

        if let Some(sink) = &self.sink {
            if let Err(e) = sink.session_started(&self.info()) {
                warn!(session_id = %self.id, error = %e, "Failed to record session start");
            }
        }

        if self.lock_log().is_empty() {
            self.append(Role::Assistant, greeting(&self.profile));
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn profile(&self) -> &ClientProfile {
        &self.profile
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            client_name: self.profile.client_name.clone(),
            client_type: self.profile.client_type.label(),
            budget_label: self.profile.budget_label(),
            started_at: self.started_at,
        }
    }

    /// Snapshot of the conversation so far.
    pub fn messages(&self) -> Vec<Message> {
        self.lock_log().messages().to_vec()
    }

    /// Whether the virtual client is composing a reply.
    pub fn is_typing(&self) -> bool {
        self.pending_replies.load(Ordering::SeqCst) > 0
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Send a trainee message and wait for the client's reply.
    ///
    /// Blank input is ignored and yields `None`. Otherwise the user message is
    /// appended at once and the assistant reply after the configured delay.
    /// The reply is scheduled on its own task, so it is appended even when the
    /// caller stops waiting for it.
    pub async fn submit(self: &Arc<Self>, text: &str) -> Option<Message> {
        if text.trim().is_empty() {
            debug!(session_id = %self.id, "Ignoring blank message");
            return None;
        }

        self.append(Role::User, text);
        let reply = respond(text, &self.profile);

        if self.pending_replies.fetch_add(1, Ordering::SeqCst) == 0 {
            self.emit(SessionEvent::TypingChanged {
                session_id: self.id.clone(),
                typing: true,
            });
        }

        let wait = self.delay.sample();
        let session = Arc::clone(self);
        let pending = tokio::spawn(async move {
            if !wait.is_zero() {
                debug!(session_id = %session.id, delay_ms = wait.as_millis() as u64, "Client is typing");
                tokio::time::sleep(wait).await;
            }
            session.deliver(reply)
        });

        match pending.await {
            Ok(message) => Some(message),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Reply task cancelled");
                None
            }
        }
    }

    fn deliver(&self, reply: String) -> Message {
        let message = self.append(Role::Assistant, reply);

        if self.pending_replies.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.emit(SessionEvent::TypingChanged {
                session_id: self.id.clone(),
                typing: false,
            });
        }
        message
    }

    /// Start the conversation over with an empty log.
    pub fn clear(&self) {
        self.lock_log().clear();
        info!(session_id = %self.id, "Conversation cleared");

        if let Some(sink) = &self.sink {
            if let Err(e) = sink.cleared(&self.id) {
                warn!(session_id = %self.id, error = %e, "Failed to clear persisted conversation");
            }
        }

        self.emit(SessionEvent::Cleared {
            session_id: self.id.clone(),
        });
    }

    fn append(&self, role: Role, content: impl Into<String>) -> Message {
        let message = self.lock_log().push(role, content);
        debug!(session_id = %self.id, role = %role, "Message appended");

        if let Some(sink) = &self.sink {
            if let Err(e) = sink.message_appended(&self.id, &message) {
                warn!(session_id = %self.id, error = %e, "Failed to persist message");
            }
        }

        self.emit(SessionEvent::MessageAppended {
            session_id: self.id.clone(),
            message: message.clone(),
        });
        message
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is the common case
        let _ = self.events.send(event);
    }

    fn lock_log(&self) -> MutexGuard<'_, ConversationLog> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
