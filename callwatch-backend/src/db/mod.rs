use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub mod tables;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(database_url: &str) -> SqliteResult<Self> {
        // Create parent directory if it doesn't exist
        if database_url != ":memory:" {
            if let Some(parent) = Path::new(database_url).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).ok();
                }
            }
        }

        let conn = Connection::open(database_url)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init()?;
        Ok(db)
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    fn init(&self) -> SqliteResult<()> {
        let conn = self.conn();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS contacts (
                id TEXT PRIMARY KEY,
                phone_number TEXT NOT NULL,
                name TEXT,
                contact_type TEXT NOT NULL,
                is_whitelisted INTEGER NOT NULL DEFAULT 0,
                is_blocked INTEGER NOT NULL DEFAULT 0,
                call_count INTEGER NOT NULL DEFAULT 0,
                last_call_date TEXT,
                notes TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS calls (
                id TEXT PRIMARY KEY,
                phone_number TEXT NOT NULL,
                contact_id TEXT,
                call_type TEXT NOT NULL,
                status TEXT NOT NULL,
                duration REAL NOT NULL,
                timestamp TEXT NOT NULL,
                is_spam INTEGER NOT NULL,
                confidence REAL NOT NULL,
                location TEXT,
                carrier_info TEXT,
                action TEXT,
                notes TEXT,
                has_transcript INTEGER NOT NULL DEFAULT 0,
                has_summary INTEGER NOT NULL DEFAULT 0,
                transcript_status TEXT
            )",
            [],
        )?;

        // UNIQUE(call_id) closes the check-then-act race on duplicate
        // creation; the controllers' early existence check is an
        // optimization, not the guard.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS transcripts (
                id TEXT PRIMARY KEY,
                call_id TEXT NOT NULL UNIQUE,
                messages TEXT NOT NULL,
                full_transcript TEXT NOT NULL,
                language TEXT NOT NULL,
                duration REAL NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS call_summaries (
                id TEXT PRIMARY KEY,
                call_id TEXT NOT NULL UNIQUE,
                transcript_id TEXT,
                summary TEXT NOT NULL,
                intent TEXT NOT NULL,
                key_points TEXT NOT NULL,
                action_items TEXT,
                follow_up_required INTEGER NOT NULL,
                satisfaction_score REAL,
                ai_model TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS spam_rules (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                pattern TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                confidence REAL NOT NULL,
                description TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS insights (
                id TEXT PRIMARY KEY,
                insight_type TEXT NOT NULL,
                message TEXT NOT NULL,
                confidence REAL NOT NULL,
                actionable INTEGER NOT NULL,
                is_read INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS call_stats (
                id TEXT PRIMARY KEY,
                total_calls INTEGER NOT NULL,
                personal_calls INTEGER NOT NULL,
                business_calls INTEGER NOT NULL,
                spam_blocked INTEGER NOT NULL,
                spam_percentage REAL NOT NULL,
                allowed_calls INTEGER NOT NULL,
                blocked_calls INTEGER NOT NULL,
                avg_call_duration REAL NOT NULL,
                top_spam_numbers TEXT NOT NULL,
                calls_change INTEGER NOT NULL,
                spam_change INTEGER NOT NULL,
                calculated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_contacts_phone ON contacts(phone_number);
             CREATE INDEX IF NOT EXISTS idx_calls_phone ON calls(phone_number);
             CREATE INDEX IF NOT EXISTS idx_calls_timestamp ON calls(timestamp);
             CREATE INDEX IF NOT EXISTS idx_calls_status ON calls(status);
             CREATE INDEX IF NOT EXISTS idx_spam_rules_active ON spam_rules(is_active);
             CREATE INDEX IF NOT EXISTS idx_insights_actionable ON insights(actionable);",
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallStatus, CallType, NewCall};

    fn new_call(phone: &str) -> NewCall {
        NewCall {
            phone_number: phone.into(),
            contact_id: None,
            call_type: CallType::Personal,
            status: CallStatus::Allowed,
            duration: 30.0,
            timestamp: "2024-01-01T10:00:00.000Z".into(),
            is_spam: false,
            confidence: 1.0,
            location: None,
            carrier_info: None,
            action: None,
            notes: None,
            has_transcript: false,
            has_summary: false,
            transcript_status: None,
        }
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.db");
        let url = path.to_str().unwrap();

        let call_id = {
            let db = Database::new(url).unwrap();
            db.insert_call(&new_call("+1-555-0100")).unwrap()
        };

        // Reopening runs init() again; existing rows must be untouched.
        let db = Database::new(url).unwrap();
        let call = db.get_call(&call_id).unwrap().unwrap();
        assert_eq!(call.phone_number, "+1-555-0100");
    }

    #[test]
    fn test_new_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("calls.db");

        let db = Database::new(path.to_str().unwrap()).unwrap();
        db.insert_call(&new_call("+1-555-0100")).unwrap();
        assert!(path.exists());
    }
}

/// Read a JSON-encoded TEXT column into a typed value.
pub(crate) fn json_col<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Serialize a value into a JSON TEXT column.
pub(crate) fn to_json_col<T: serde::Serialize>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}
