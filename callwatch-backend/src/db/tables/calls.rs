//! Database operations for the `calls` table
//! Call events plus the denormalized hasTranscript/hasSummary flags.

use rusqlite::Result as SqliteResult;
use uuid::Uuid;

use crate::db::Database;
use crate::models::{Call, CallAction, CallStatus, CallType, CallUpdate, NewCall, TranscriptStatus};

const CALL_COLUMNS: &str = "id, phone_number, contact_id, call_type, status, duration, timestamp,
     is_spam, confidence, location, carrier_info, action, notes,
     has_transcript, has_summary, transcript_status";

fn enum_col<T>(idx: usize, raw: String, parse: fn(&str) -> Option<T>) -> SqliteResult<T> {
    parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unexpected enum value: {}", raw).into(),
        )
    })
}

fn map_call(row: &rusqlite::Row<'_>) -> SqliteResult<Call> {
    let call_type: String = row.get(3)?;
    let status: String = row.get(4)?;
    let action: Option<String> = row.get(11)?;
    let transcript_status: Option<String> = row.get(15)?;

    Ok(Call {
        id: row.get(0)?,
        phone_number: row.get(1)?,
        contact_id: row.get(2)?,
        call_type: enum_col(3, call_type, CallType::from_str)?,
        status: enum_col(4, status, CallStatus::from_str)?,
        duration: row.get(5)?,
        timestamp: row.get(6)?,
        is_spam: row.get::<_, i64>(7)? != 0,
        confidence: row.get(8)?,
        location: row.get(9)?,
        carrier_info: row.get(10)?,
        action: action
            .map(|a| enum_col(11, a, CallAction::from_str))
            .transpose()?,
        notes: row.get(12)?,
        has_transcript: row.get::<_, i64>(13)? != 0,
        has_summary: row.get::<_, i64>(14)? != 0,
        transcript_status: transcript_status
            .map(|s| enum_col(15, s, TranscriptStatus::from_str))
            .transpose()?,
    })
}

/// The subset of a call the reconciler compares against table truth.
#[derive(Debug, Clone)]
pub struct CallFlagRow {
    pub id: String,
    pub has_transcript: bool,
    pub has_summary: bool,
    pub transcript_status: Option<TranscriptStatus>,
}

impl Database {
    /// Insert a validated call and return its generated ID.
    pub fn insert_call(&self, call: &NewCall) -> SqliteResult<String> {
        let conn = self.conn();
        let id = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO calls (
                id, phone_number, contact_id, call_type, status, duration, timestamp,
                is_spam, confidence, location, carrier_info, action, notes,
                has_transcript, has_summary, transcript_status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            rusqlite::params![
                id,
                call.phone_number,
                call.contact_id,
                call.call_type.as_str(),
                call.status.as_str(),
                call.duration,
                call.timestamp,
                if call.is_spam { 1 } else { 0 },
                call.confidence,
                call.location,
                call.carrier_info,
                call.action.map(|a| a.as_str()),
                call.notes,
                if call.has_transcript { 1 } else { 0 },
                if call.has_summary { 1 } else { 0 },
                call.transcript_status.map(|s| s.as_str()),
            ],
        )?;

        Ok(id)
    }

    pub fn get_call(&self, id: &str) -> SqliteResult<Option<Call>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("SELECT {} FROM calls WHERE id = ?1", CALL_COLUMNS))?;
        let result = stmt.query_row([id], map_call);
        match result {
            Ok(call) => Ok(Some(call)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn call_exists(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM calls WHERE id = ?1)",
            [id],
            |row| row.get::<_, i64>(0),
        )
        .map(|n| n != 0)
    }

    /// List calls newest-first, with optional equality filters and a limit.
    pub fn list_calls(
        &self,
        phone_number: Option<&str>,
        call_type: Option<CallType>,
        status: Option<CallStatus>,
        limit: Option<i64>,
    ) -> SqliteResult<Vec<Call>> {
        let conn = self.conn();

        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(phone) = phone_number {
            params.push(Box::new(phone.to_string()));
            clauses.push(format!("phone_number = ?{}", params.len()));
        }
        if let Some(t) = call_type {
            params.push(Box::new(t.as_str()));
            clauses.push(format!("call_type = ?{}", params.len()));
        }
        if let Some(s) = status {
            params.push(Box::new(s.as_str()));
            clauses.push(format!("status = ?{}", params.len()));
        }

        let mut sql = format!("SELECT {} FROM calls", CALL_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY timestamp DESC");
        if let Some(n) = limit {
            params.push(Box::new(n));
            sql.push_str(&format!(" LIMIT ?{}", params.len()));
        }

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), map_call)?;
        rows.collect()
    }

    /// Apply a partial update; returns the updated call, or None if absent.
    pub fn update_call(&self, id: &str, update: &CallUpdate) -> SqliteResult<Option<Call>> {
        if update.is_empty() {
            return self.get_call(id);
        }

        let conn = self.conn();

        // Build dynamic update query
        let mut sets: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        let mut push = |sets: &mut Vec<String>,
                        params: &mut Vec<Box<dyn rusqlite::ToSql>>,
                        column: &str,
                        value: Box<dyn rusqlite::ToSql>| {
            params.push(value);
            sets.push(format!("{} = ?{}", column, params.len()));
        };

        if let Some(t) = update.call_type {
            push(&mut sets, &mut params, "call_type", Box::new(t.as_str()));
        }
        if let Some(s) = update.status {
            push(&mut sets, &mut params, "status", Box::new(s.as_str()));
        }
        if let Some(spam) = update.is_spam {
            push(
                &mut sets,
                &mut params,
                "is_spam",
                Box::new(if spam { 1 } else { 0 }),
            );
        }
        if let Some(c) = update.confidence {
            push(&mut sets, &mut params, "confidence", Box::new(c));
        }
        if let Some(a) = update.action {
            push(&mut sets, &mut params, "action", Box::new(a.as_str()));
        }
        if let Some(notes) = &update.notes {
            push(&mut sets, &mut params, "notes", Box::new(notes.clone()));
        }
        if let Some(location) = &update.location {
            push(
                &mut sets,
                &mut params,
                "location",
                Box::new(location.clone()),
            );
        }
        if let Some(carrier) = &update.carrier_info {
            push(
                &mut sets,
                &mut params,
                "carrier_info",
                Box::new(carrier.clone()),
            );
        }
        if let Some(has) = update.has_transcript {
            push(
                &mut sets,
                &mut params,
                "has_transcript",
                Box::new(if has { 1 } else { 0 }),
            );
        }
        if let Some(has) = update.has_summary {
            push(
                &mut sets,
                &mut params,
                "has_summary",
                Box::new(if has { 1 } else { 0 }),
            );
        }
        if let Some(s) = update.transcript_status {
            push(
                &mut sets,
                &mut params,
                "transcript_status",
                Box::new(s.as_str()),
            );
        }

        params.push(Box::new(id.to_string()));
        let sql = format!(
            "UPDATE calls SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_ref.as_slice())?;

        drop(conn);
        self.get_call(id)
    }

    /// Set the denormalized flags and transcript status in one statement.
    /// Used by the reconciler when a call's flags disagree with table truth.
    pub fn set_call_flags(
        &self,
        id: &str,
        has_transcript: bool,
        has_summary: bool,
        transcript_status: Option<TranscriptStatus>,
    ) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute(
            "UPDATE calls SET has_transcript = ?1, has_summary = ?2, transcript_status = ?3
             WHERE id = ?4",
            rusqlite::params![
                if has_transcript { 1 } else { 0 },
                if has_summary { 1 } else { 0 },
                transcript_status.map(|s| s.as_str()),
                id
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Flag side effect of transcript creation.
    pub fn mark_call_transcribed(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute(
            "UPDATE calls SET has_transcript = 1, transcript_status = ?1 WHERE id = ?2",
            rusqlite::params![TranscriptStatus::Completed.as_str(), id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Flag side effect of transcript deletion.
    pub fn clear_call_transcript_flag(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected = conn.execute(
            "UPDATE calls SET has_transcript = 0, transcript_status = NULL WHERE id = ?1",
            [id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Flag side effect of summary creation.
    pub fn mark_call_summarized(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected =
            conn.execute("UPDATE calls SET has_summary = 1 WHERE id = ?1", [id])?;
        Ok(rows_affected > 0)
    }

    /// All calls' stored flags, for the reconciliation sweep.
    pub fn list_call_flag_rows(&self) -> SqliteResult<Vec<CallFlagRow>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, has_transcript, has_summary, transcript_status FROM calls")?;
        let rows = stmt.query_map([], |row| {
            let transcript_status: Option<String> = row.get(3)?;
            Ok(CallFlagRow {
                id: row.get(0)?,
                has_transcript: row.get::<_, i64>(1)? != 0,
                has_summary: row.get::<_, i64>(2)? != 0,
                transcript_status: transcript_status
                    .map(|s| enum_col(3, s, TranscriptStatus::from_str))
                    .transpose()?,
            })
        })?;
        rows.collect()
    }
}
