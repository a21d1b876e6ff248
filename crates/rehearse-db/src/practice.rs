//! Practice history shown on the dashboard.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;

/// Summary of one practice session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeRecord {
    pub id: String,
    pub client_name: String,
    pub client_type: String,
    pub budget_label: String,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub message_count: usize,
}

impl PracticeRecord {
    pub fn duration_minutes(&self) -> f64 {
        let secs = (self.last_activity_at - self.started_at).num_seconds().max(0);
        secs as f64 / 60.0
    }
}

/// Aggregate dashboard numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeStats {
    pub total_sessions: usize,
    pub total_messages: usize,
    pub practice_minutes: f64,
    pub client_types_practiced: usize,
}

/// Practice history store with a borrowed connection.
pub struct Practice<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Practice<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Save a practice record (insert or update).
    pub fn save(&self, record: &PracticeRecord) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            r#"
            INSERT INTO practice_sessions (id, client_name, client_type, budget_label, started_at, last_activity_at, message_count)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                client_name = excluded.client_name,
                client_type = excluded.client_type,
                budget_label = excluded.budget_label,
                last_activity_at = excluded.last_activity_at,
                message_count = excluded.message_count
            "#,
            params![
                record.id,
                record.client_name,
                record.client_type,
                record.budget_label,
                record.started_at.to_rfc3339(),
                record.last_activity_at.to_rfc3339(),
                record.message_count as i64,
            ],
        )?;

        Ok(())
    }

    /// Bump the message count and activity time of a session.
    pub fn record_message(&self, id: &str, at: DateTime<Utc>) -> Result<bool, rusqlite::Error> {
        let rows = self.conn.execute(
            "UPDATE practice_sessions SET message_count = message_count + 1, last_activity_at = ?2 WHERE id = ?1",
            params![id, at.to_rfc3339()],
        )?;
        Ok(rows > 0)
    }

    pub fn reset_messages(&self, id: &str) -> Result<bool, rusqlite::Error> {
        let rows = self.conn.execute(
            "UPDATE practice_sessions SET message_count = 0 WHERE id = ?1",
            params![id],
        )?;
        Ok(rows > 0)
    }

    /// Most recent sessions first.
    pub fn list(&self, limit: usize) -> Result<Vec<PracticeRecord>, rusqlite::Error> {
        self.query(limit as i64)
    }

    pub fn stats(&self) -> Result<PracticeStats, rusqlite::Error> {
        // LIMIT -1 is unbounded in SQLite
        let records = self.query(-1)?;

        let mut client_types: Vec<&str> = records.iter().map(|r| r.client_type.as_str()).collect();
        client_types.sort_unstable();
        client_types.dedup();

        Ok(PracticeStats {
            total_sessions: records.len(),
            total_messages: records.iter().map(|r| r.message_count).sum(),
            practice_minutes: records.iter().map(PracticeRecord::duration_minutes).sum(),
            client_types_practiced: client_types.len(),
        })
    }

    fn query(&self, limit: i64) -> Result<Vec<PracticeRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, client_name, client_type, budget_label, started_at, last_activity_at, message_count FROM practice_sessions ORDER BY started_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(records)
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<PracticeRecord, rusqlite::Error> {
        let started_at_str: String = row.get(4)?;
        let last_activity_at_str: String = row.get(5)?;

        Ok(PracticeRecord {
            id: row.get(0)?,
            client_name: row.get(1)?,
            client_type: row.get(2)?,
            budget_label: row.get(3)?,
            started_at: DateTime::parse_from_rfc3339(&started_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            last_activity_at: DateTime::parse_from_rfc3339(&last_activity_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            message_count: row.get::<_, i64>(6)? as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::{Duration, TimeZone};

    fn record(id: &str, client_type: &str, day: u32, minutes: i64, messages: usize) -> PracticeRecord {
        let started_at = Utc.with_ymd_and_hms(2026, 3, day, 10, 0, 0).unwrap();
        PracticeRecord {
            id: id.to_string(),
            client_name: format!("Client {}", id),
            client_type: client_type.to_string(),
            budget_label: "$450,000 - $500,000".to_string(),
            started_at,
            last_activity_at: started_at + Duration::minutes(minutes),
            message_count: messages,
        }
    }

    #[test]
    fn test_list_newest_first_with_limit() {
        let db = Database::open_in_memory().unwrap();
        db.practice().save(&record("a", "Investor", 1, 15, 24)).unwrap();
        db.practice().save(&record("b", "Downsizer", 3, 22, 31)).unwrap();
        db.practice().save(&record("c", "Investor", 2, 18, 27)).unwrap();

        let ids: Vec<String> = db
            .practice()
            .list(2)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_record_message_and_reset() {
        let db = Database::open_in_memory().unwrap();
        let rec = record("a", "Investor", 1, 0, 0);
        db.practice().save(&rec).unwrap();

        let later = rec.started_at + Duration::minutes(5);
        assert!(db.practice().record_message("a", later).unwrap());
        assert!(db.practice().record_message("a", later).unwrap());
        assert!(!db.practice().record_message("missing", later).unwrap());

        let records = db.practice().list(1).unwrap();
        let stored = &records[0];
        assert_eq!(stored.message_count, 2);
        assert_eq!(stored.last_activity_at, later);

        assert!(db.practice().reset_messages("a").unwrap());
        assert_eq!(db.practice().list(1).unwrap()[0].message_count, 0);
    }

    #[test]
    fn test_stats() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.practice().stats().unwrap().total_sessions, 0);

        db.practice().save(&record("a", "Investor", 1, 15, 24)).unwrap();
        db.practice().save(&record("b", "Downsizer", 2, 22, 31)).unwrap();
        db.practice().save(&record("c", "Investor", 3, 18, 27)).unwrap();

        let stats = db.practice().stats().unwrap();
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.total_messages, 82);
        assert!((stats.practice_minutes - 55.0).abs() < 0.001);
        assert_eq!(stats.client_types_practiced, 2);
    }
}
