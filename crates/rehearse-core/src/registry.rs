use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rehearse_persona::{ClientProfile, ProfileDraft};
use tracing::info;

use crate::delay::ReplyDelay;
use crate::error::SessionError;
use crate::session::{ConversationSink, PracticeSession};

/// Live practice sessions, keyed by session id.
///
/// Sessions exist from [`SessionRegistry::create`] until
/// [`SessionRegistry::remove`]; nothing about them outlives the registry
/// except what the sink persisted.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<PracticeSession>>>,
    delay: ReplyDelay,
    sink: Option<Arc<dyn ConversationSink>>,
}

impl SessionRegistry {
    pub fn new(delay: ReplyDelay) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            delay,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ConversationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Validate a configuration form and start a session for it.
    pub fn create(&self, draft: &ProfileDraft) -> Result<Arc<PracticeSession>, SessionError> {
        let profile = draft.validate()?;
        Ok(self.start(profile))
    }

    /// Start a session for an already validated profile.
    pub fn start(&self, profile: ClientProfile) -> Arc<PracticeSession> {
        let mut session = PracticeSession::new(profile, self.delay);
        if let Some(sink) = &self.sink {
            session = session.with_sink(sink.clone());
        }

        let session = Arc::new(session);
        session.start();

        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(session.id().to_string(), session.clone());

        session
    }

    pub fn get(&self, id: &str) -> Result<Arc<PracticeSession>, SessionError> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    /// End a session. In-flight replies still complete on their own handle.
    pub fn remove(&self, id: &str) -> Result<Arc<PracticeSession>, SessionError> {
        let session = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;

        info!(session_id = %id, messages = session.messages().len(), "Practice session ended");
        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
