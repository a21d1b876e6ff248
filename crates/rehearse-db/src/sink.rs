use std::sync::Arc;

use rehearse_core::{ConversationSink, Message, SessionInfo, SinkError};

use crate::practice::PracticeRecord;
use crate::Database;

/// Persists practice sessions under one storage key.
#[derive(Clone)]
pub struct ConversationStore {
    db: Arc<Database>,
    storage_key: String,
}

impl ConversationStore {
    pub fn new(db: Arc<Database>, storage_key: impl Into<String>) -> Self {
        Self {
            db,
            storage_key: storage_key.into(),
        }
    }
}

impl ConversationSink for ConversationStore {
    fn session_started(&self, info: &SessionInfo) -> Result<(), SinkError> {
        let record = PracticeRecord {
            id: info.id.clone(),
            client_name: info.client_name.clone(),
            client_type: info.client_type.clone(),
            budget_label: info.budget_label.clone(),
            started_at: info.started_at,
            last_activity_at: info.started_at,
            message_count: 0,
        };
        self.db.practice().save(&record)?;
        Ok(())
    }

    fn message_appended(&self, session_id: &str, message: &Message) -> Result<(), SinkError> {
        self.db
            .conversations()
            .append(&self.storage_key, session_id, message)?;
        self.db
            .practice()
            .record_message(session_id, message.timestamp)?;
        tracing::trace!(session_id, message_id = %message.id, "Message persisted");
        Ok(())
    }

    fn cleared(&self, session_id: &str) -> Result<(), SinkError> {
        let removed = self
            .db
            .conversations()
            .clear(&self.storage_key, session_id)?;
        self.db.practice().reset_messages(session_id)?;
        tracing::debug!(session_id, removed, "Persisted conversation cleared");
        Ok(())
    }
}
