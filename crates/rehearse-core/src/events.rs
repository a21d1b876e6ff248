use serde::Serialize;

use crate::conversation::Message;

/// Changes to a practice session, broadcast to live subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    MessageAppended { session_id: String, message: Message },
    TypingChanged { session_id: String, typing: bool },
    Cleared { session_id: String },
}

impl SessionEvent {
    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::MessageAppended { .. } => "message_appended",
            SessionEvent::TypingChanged { .. } => "typing_changed",
            SessionEvent::Cleared { .. } => "cleared",
        }
    }
}
