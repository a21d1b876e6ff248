mod conversation;
mod delay;
mod error;
mod events;
mod registry;
mod session;

pub use conversation::{ConversationLog, Message, Role};
pub use delay::ReplyDelay;
pub use error::SessionError;
pub use events::SessionEvent;
pub use registry::SessionRegistry;
pub use session::{ConversationSink, PracticeSession, SessionInfo, SinkError};
