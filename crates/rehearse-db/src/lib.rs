//! Database layer for rehearse.
//!
//! Provides a unified `Database` struct that owns the SQLite connection
//! and provides access to domain-specific stores.

mod conversations;
mod practice;
mod sink;

pub use conversations::Conversations;
pub use practice::{Practice, PracticeRecord, PracticeStats};
pub use sink::ConversationStore;

use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// Storage key the browser client used for its persisted chat log.
pub const DEFAULT_STORAGE_KEY: &str = "chat-storage";

/// The main database struct that owns the SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the default location.
    ///
    /// The default location is `~/.local/share/rehearse/rehearse.db`.
    pub fn open() -> Result<Self, rusqlite::Error> {
        let db_path = Self::default_path();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        Self::open_at(&db_path)
    }

    /// Open or create a database at a specific path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the default database path.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rehearse")
            .join("rehearse.db")
    }

    /// Access persisted conversation logs.
    pub fn conversations(&self) -> Conversations<'_> {
        Conversations::new(self.lock())
    }

    /// Access practice history.
    pub fn practice(&self) -> Practice<'_> {
        Practice::new(self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Initialize the database schema.
    fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                storage_key TEXT NOT NULL,
                session_id TEXT NOT NULL,
                id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                UNIQUE (storage_key, session_id, id)
            );

            CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(storage_key, session_id, seq);

            CREATE TABLE IF NOT EXISTS practice_sessions (
                id TEXT PRIMARY KEY,
                client_name TEXT NOT NULL,
                client_type TEXT NOT NULL,
                budget_label TEXT NOT NULL,
                started_at TEXT NOT NULL,
                last_activity_at TEXT NOT NULL,
                message_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_practice_started_at ON practice_sessions(started_at DESC);
            "#,
        )
    }
}
