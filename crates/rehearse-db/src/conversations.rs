//! Conversation log persistence.

use chrono::{DateTime, Utc};
use rehearse_core::{Message, Role};
use rusqlite::{params, Connection};
use std::sync::MutexGuard;

/// Conversation store with a borrowed connection.
///
/// Messages are grouped by storage key and session id and always read back
/// in insertion order.
pub struct Conversations<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Conversations<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Append a message. Re-appending the same message id is a no-op.
    pub fn append(
        &self,
        storage_key: &str,
        session_id: &str,
        message: &Message,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            r#"
            INSERT OR IGNORE INTO messages (storage_key, session_id, id, role, content, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                storage_key,
                session_id,
                message.id,
                message.role.as_str(),
                message.content,
                message.timestamp.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// All messages of a session, oldest first.
    pub fn list(&self, storage_key: &str, session_id: &str) -> Result<Vec<Message>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, role, content, timestamp FROM messages WHERE storage_key = ?1 AND session_id = ?2 ORDER BY seq",
        )?;
        let rows = stmt.query_map(params![storage_key, session_id], Self::row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }

        Ok(messages)
    }

    pub fn count(&self, storage_key: &str, session_id: &str) -> Result<usize, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE storage_key = ?1 AND session_id = ?2",
            params![storage_key, session_id],
            |row| row.get::<_, i64>(0).map(|n| n as usize),
        )
    }

    /// Delete a session's messages, returning how many were removed.
    pub fn clear(&self, storage_key: &str, session_id: &str) -> Result<usize, rusqlite::Error> {
        self.conn.execute(
            "DELETE FROM messages WHERE storage_key = ?1 AND session_id = ?2",
            params![storage_key, session_id],
        )
    }

    fn row_to_message(row: &rusqlite::Row) -> Result<Message, rusqlite::Error> {
        let role_str: String = row.get(1)?;
        let timestamp_str: String = row.get(3)?;

        let role = role_str.parse::<Role>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
            )
        })?;

        Ok(Message {
            id: row.get(0)?,
            role,
            content: row.get(2)?,
            timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
