//! Database operations for the `transcripts` table
//! At most one transcript per call, enforced by UNIQUE(call_id).

use rusqlite::Result as SqliteResult;
use uuid::Uuid;

use crate::db::{json_col, to_json_col, Database};
use crate::models::{join_messages, NewTranscript, Transcript, TranscriptUpdate};

fn map_transcript(row: &rusqlite::Row<'_>) -> SqliteResult<Transcript> {
    Ok(Transcript {
        id: row.get(0)?,
        call_id: row.get(1)?,
        transcript: json_col(row, 2)?,
        full_transcript: row.get(3)?,
        language: row.get(4)?,
        duration: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl Database {
    pub fn insert_transcript(&self, transcript: &NewTranscript) -> SqliteResult<String> {
        let conn = self.conn();
        let id = Uuid::new_v4().to_string();
        let messages = to_json_col(&transcript.messages)?;

        conn.execute(
            "INSERT INTO transcripts (
                id, call_id, messages, full_transcript, language, duration, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                id,
                transcript.call_id,
                messages,
                transcript.full_transcript,
                transcript.language,
                transcript.duration,
                transcript.created_at,
            ],
        )?;

        Ok(id)
    }

    pub fn get_transcript_by_call(&self, call_id: &str) -> SqliteResult<Option<Transcript>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, call_id, messages, full_transcript, language, duration, created_at
             FROM transcripts WHERE call_id = ?1",
        )?;
        match stmt.query_row([call_id], map_transcript) {
            Ok(transcript) => Ok(Some(transcript)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn call_has_transcript(&self, call_id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM transcripts WHERE call_id = ?1)",
            [call_id],
            |row| row.get::<_, i64>(0),
        )
        .map(|n| n != 0)
    }

    /// Replace fields of a call's transcript. When the message array changes
    /// and no explicit full_transcript is given, the combined text is
    /// rederived from the new messages.
    pub fn update_transcript(
        &self,
        call_id: &str,
        update: &TranscriptUpdate,
    ) -> SqliteResult<Option<Transcript>> {
        let conn = self.conn();

        let mut sets: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(messages) = &update.messages {
            params.push(Box::new(to_json_col(messages)?));
            sets.push(format!("messages = ?{}", params.len()));

            let full = update
                .full_transcript
                .clone()
                .unwrap_or_else(|| join_messages(messages));
            params.push(Box::new(full));
            sets.push(format!("full_transcript = ?{}", params.len()));
        } else if let Some(full) = &update.full_transcript {
            params.push(Box::new(full.clone()));
            sets.push(format!("full_transcript = ?{}", params.len()));
        }
        if let Some(language) = &update.language {
            params.push(Box::new(language.clone()));
            sets.push(format!("language = ?{}", params.len()));
        }
        if let Some(duration) = update.duration {
            params.push(Box::new(duration));
            sets.push(format!("duration = ?{}", params.len()));
        }

        if sets.is_empty() {
            drop(conn);
            return self.get_transcript_by_call(call_id);
        }

        params.push(Box::new(call_id.to_string()));
        let sql = format!(
            "UPDATE transcripts SET {} WHERE call_id = ?{}",
            sets.join(", "),
            params.len()
        );
        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_ref.as_slice())?;

        drop(conn);
        self.get_transcript_by_call(call_id)
    }

    pub fn delete_transcript(&self, call_id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute("DELETE FROM transcripts WHERE call_id = ?1", [call_id])?;
        Ok(rows_affected > 0)
    }
}
