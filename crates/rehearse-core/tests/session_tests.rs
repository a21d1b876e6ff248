use std::sync::{Arc, Mutex};
use std::time::Duration;

use rehearse_core::{
    ConversationSink, Message, PracticeSession, ReplyDelay, Role, SessionError, SessionEvent,
    SessionInfo, SessionRegistry, SinkError,
};
use rehearse_persona::{respond, ClientProfile, ClientType, PersonalityTrait, ProfileDraft};

/// Helper: a validated profile for the urgent investor persona.
fn investor() -> ClientProfile {
    ClientProfile {
        id: String::new(),
        client_name: "Michael Chen".to_string(),
        client_type: ClientType::Investor,
        budget_min: 600_000,
        budget_max: 800_000,
        urgency_level: 9,
        personality_traits: vec![PersonalityTrait::Skeptical],
        property_preferences: "a duplex with rental income".to_string(),
        special_requirements: None,
    }
}

/// Sink that records every call as a short string.
#[derive(Default)]
struct RecordingSink {
    calls: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ConversationSink for RecordingSink {
    fn session_started(&self, info: &SessionInfo) -> Result<(), SinkError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("start:{}", info.client_name));
        Ok(())
    }

    fn message_appended(&self, _session_id: &str, message: &Message) -> Result<(), SinkError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("append:{}", message.role));
        Ok(())
    }

    fn cleared(&self, _session_id: &str) -> Result<(), SinkError> {
        self.calls.lock().unwrap().push("clear".to_string());
        Ok(())
    }
}

/// Sink whose writes always fail.
struct BrokenSink;

impl ConversationSink for BrokenSink {
    fn message_appended(&self, _session_id: &str, _message: &Message) -> Result<(), SinkError> {
        Err("disk full".into())
    }

    fn cleared(&self, _session_id: &str) -> Result<(), SinkError> {
        Err("disk full".into())
    }
}

// ============================================================
// Orchestration
// ============================================================

#[tokio::test]
async fn test_start_greets_trainee() {
    let session = PracticeSession::new(investor(), ReplyDelay::None);
    session.start();

    let messages = session.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::Assistant);
    assert!(messages[0].content.starts_with("Hi there! I'm Michael Chen."));
    assert!(!session.id().is_empty());
}

#[tokio::test]
async fn test_submit_appends_user_then_reply() {
    let session = Arc::new(PracticeSession::new(investor(), ReplyDelay::None));
    session.start();

    let reply = session.submit("What's the timeline?").await.unwrap();
    assert_eq!(reply.role, Role::Assistant);
    assert!(reply.content.contains("next month"));
    assert_eq!(reply.content, respond("What's the timeline?", session.profile()));

    let messages = session.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].content, "What's the timeline?");
    assert_eq!(messages[2], reply);
    assert!(!session.is_typing());
}

#[tokio::test]
async fn test_blank_submit_is_ignored() {
    let session = Arc::new(PracticeSession::new(investor(), ReplyDelay::None));
    session.start();

    assert!(session.submit("   ").await.is_none());
    assert!(session.submit("").await.is_none());
    assert_eq!(session.messages().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_typing_while_reply_is_delayed() {
    let session = Arc::new(PracticeSession::new(
        investor(),
        ReplyDelay::Fixed(Duration::from_millis(1500)),
    ));
    session.start();

    let handle = {
        let session = session.clone();
        tokio::spawn(async move { session.submit("Is it a good price?").await })
    };

    for _ in 0..5 {
        tokio::task::yield_now().await;
    }

    // User message is in, reply is pending
    assert!(session.is_typing());
    assert_eq!(session.messages().len(), 2);

    let reply = handle.await.unwrap().unwrap();
    assert!(reply.content.contains("$600,000"));
    assert!(!session.is_typing());
    assert_eq!(session.messages().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_reply_lands_after_caller_stops_waiting() {
    let session = Arc::new(PracticeSession::new(
        investor(),
        ReplyDelay::Fixed(Duration::from_millis(2000)),
    ));
    session.start();
    let mut rx = session.subscribe();

    // Give up on the reply well before the delay elapses
    let waited = tokio::time::timeout(Duration::from_millis(100), session.submit("when?")).await;
    assert!(waited.is_err());
    assert!(session.is_typing());

    tokio::time::sleep(Duration::from_secs(10)).await;

    let messages = session.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2].role, Role::Assistant);
    assert!(messages[2].content.contains("next month"));
    assert!(!session.is_typing());

    let mut typing = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::TypingChanged { typing: t, .. } = event {
            typing.push(t);
        }
    }
    assert_eq!(typing, vec![true, false]);
}

#[tokio::test]
async fn test_events_are_broadcast_in_order() {
    let session = Arc::new(PracticeSession::new(investor(), ReplyDelay::None));
    session.start();
    let mut rx = session.subscribe();

    session.submit("hello").await.unwrap();

    let mut names = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::MessageAppended { message, .. } = &event {
            names.push(format!("{}:{}", event.name(), message.role));
        } else {
            names.push(event.name().to_string());
        }
    }

    assert_eq!(
        names,
        vec![
            "message_appended:user",
            "typing_changed",
            "message_appended:assistant",
            "typing_changed",
        ]
    );
}

#[tokio::test]
async fn test_sink_sees_every_change() {
    let sink = Arc::new(RecordingSink::default());
    let session =
        Arc::new(PracticeSession::new(investor(), ReplyDelay::None).with_sink(sink.clone()));
    session.start();
    session.submit("Which area?").await.unwrap();
    session.clear();

    assert_eq!(
        sink.calls(),
        vec![
            "start:Michael Chen",
            "append:assistant",
            "append:user",
            "append:assistant",
            "clear",
        ]
    );
    assert!(session.messages().is_empty());
}

#[tokio::test]
async fn test_sink_failures_do_not_break_session() {
    let session = Arc::new(
        PracticeSession::new(investor(), ReplyDelay::None).with_sink(Arc::new(BrokenSink)),
    );
    session.start();

    let reply = session.submit("budget?").await.unwrap();
    assert!(reply.content.contains("$800,000"));
    assert_eq!(session.messages().len(), 3);
}

// ============================================================
// Registry
// ============================================================

#[tokio::test]
async fn test_registry_lifecycle() {
    let registry = SessionRegistry::new(ReplyDelay::None);
    assert!(registry.is_empty());

    let draft = ProfileDraft {
        client_name: "Olivia Taylor".to_string(),
        client_type: Some(ClientType::FamilyHome),
        property_preferences: "4 bedrooms near a park".to_string(),
        ..Default::default()
    };

    let session = registry.create(&draft).unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(session.id(), session.profile().id);

    let fetched = registry.get(session.id()).unwrap();
    assert!(Arc::ptr_eq(&session, &fetched));

    registry.remove(session.id()).unwrap();
    assert!(matches!(
        registry.get(session.id()),
        Err(SessionError::NotFound(_))
    ));
    assert!(matches!(
        registry.remove(session.id()),
        Err(SessionError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_registry_rejects_invalid_form() {
    let registry = SessionRegistry::new(ReplyDelay::None);
    let result = registry.create(&ProfileDraft::default());

    match result {
        Err(SessionError::InvalidProfile(err)) => assert_eq!(err.fields().len(), 2),
        _ => panic!("expected InvalidProfile"),
    }
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let registry = SessionRegistry::new(ReplyDelay::None);
    let a = registry.start(investor());
    let b = registry.start(investor());
    assert_ne!(a.id(), b.id());

    a.submit("hello").await.unwrap();
    assert_eq!(a.messages().len(), 3);
    assert_eq!(b.messages().len(), 1);
}
