//! Database operations for the `call_summaries` table
//! At most one summary per call, enforced by UNIQUE(call_id).

use chrono::Utc;
use rusqlite::Result as SqliteResult;
use uuid::Uuid;

use crate::db::{json_col, to_json_col, Database};
use crate::models::{CallSummary, NewCallSummary, SummaryUpdate};

fn map_summary(row: &rusqlite::Row<'_>) -> SqliteResult<CallSummary> {
    let action_items: Option<String> = row.get(6)?;
    Ok(CallSummary {
        id: row.get(0)?,
        call_id: row.get(1)?,
        transcript_id: row.get(2)?,
        summary: row.get(3)?,
        intent: json_col(row, 4)?,
        key_points: json_col(row, 5)?,
        action_items: action_items
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        6,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })
            })
            .transpose()?,
        follow_up_required: row.get::<_, i64>(7)? != 0,
        satisfaction_score: row.get(8)?,
        ai_model: row.get(9)?,
        created_at: row.get(10)?,
    })
}

const SUMMARY_COLUMNS: &str = "id, call_id, transcript_id, summary, intent, key_points,
     action_items, follow_up_required, satisfaction_score, ai_model, created_at";

impl Database {
    pub fn insert_call_summary(&self, summary: &NewCallSummary) -> SqliteResult<String> {
        let conn = self.conn();
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let intent = to_json_col(&summary.intent)?;
        let key_points = to_json_col(&summary.key_points)?;
        let action_items = summary
            .action_items
            .as_ref()
            .map(|items| to_json_col(items))
            .transpose()?;

        conn.execute(
            "INSERT INTO call_summaries (
                id, call_id, transcript_id, summary, intent, key_points,
                action_items, follow_up_required, satisfaction_score, ai_model, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                id,
                summary.call_id,
                summary.transcript_id,
                summary.summary,
                intent,
                key_points,
                action_items,
                if summary.follow_up_required { 1 } else { 0 },
                summary.satisfaction_score,
                summary.ai_model,
                now,
            ],
        )?;

        Ok(id)
    }

    pub fn get_summary_by_call(&self, call_id: &str) -> SqliteResult<Option<CallSummary>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM call_summaries WHERE call_id = ?1",
            SUMMARY_COLUMNS
        ))?;
        match stmt.query_row([call_id], map_summary) {
            Ok(summary) => Ok(Some(summary)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn call_has_summary(&self, call_id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM call_summaries WHERE call_id = ?1)",
            [call_id],
            |row| row.get::<_, i64>(0),
        )
        .map(|n| n != 0)
    }

    pub fn update_call_summary(
        &self,
        call_id: &str,
        update: &SummaryUpdate,
    ) -> SqliteResult<Option<CallSummary>> {
        let conn = self.conn();

        let mut sets: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(summary) = &update.summary {
            params.push(Box::new(summary.clone()));
            sets.push(format!("summary = ?{}", params.len()));
        }
        if let Some(intent) = &update.intent {
            params.push(Box::new(to_json_col(intent)?));
            sets.push(format!("intent = ?{}", params.len()));
        }
        if let Some(key_points) = &update.key_points {
            params.push(Box::new(to_json_col(key_points)?));
            sets.push(format!("key_points = ?{}", params.len()));
        }
        if let Some(action_items) = &update.action_items {
            params.push(Box::new(to_json_col(action_items)?));
            sets.push(format!("action_items = ?{}", params.len()));
        }
        if let Some(follow_up) = update.follow_up_required {
            params.push(Box::new(if follow_up { 1 } else { 0 }));
            sets.push(format!("follow_up_required = ?{}", params.len()));
        }
        if let Some(score) = update.satisfaction_score {
            params.push(Box::new(score));
            sets.push(format!("satisfaction_score = ?{}", params.len()));
        }
        if let Some(model) = &update.ai_model {
            params.push(Box::new(model.clone()));
            sets.push(format!("ai_model = ?{}", params.len()));
        }

        if sets.is_empty() {
            drop(conn);
            return self.get_summary_by_call(call_id);
        }

        params.push(Box::new(call_id.to_string()));
        let sql = format!(
            "UPDATE call_summaries SET {} WHERE call_id = ?{}",
            sets.join(", "),
            params.len()
        );
        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_ref.as_slice())?;

        drop(conn);
        self.get_summary_by_call(call_id)
    }
}
