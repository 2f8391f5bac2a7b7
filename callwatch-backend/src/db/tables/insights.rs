//! Database operations for the `insights` table

use chrono::Utc;
use rusqlite::Result as SqliteResult;
use uuid::Uuid;

use crate::db::Database;
use crate::models::{Insight, InsightType, NewInsight};

fn map_insight(row: &rusqlite::Row<'_>) -> SqliteResult<Insight> {
    let insight_type: String = row.get(1)?;
    Ok(Insight {
        id: row.get(0)?,
        insight_type: InsightType::from_str(&insight_type).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                format!("unexpected enum value: {}", insight_type).into(),
            )
        })?,
        message: row.get(2)?,
        confidence: row.get(3)?,
        actionable: row.get::<_, i64>(4)? != 0,
        is_read: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
    })
}

impl Database {
    /// Insert a new insight; starts unread.
    pub fn insert_insight(&self, insight: &NewInsight) -> SqliteResult<String> {
        let conn = self.conn();
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO insights (id, insight_type, message, confidence, actionable, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
            rusqlite::params![
                id,
                insight.insight_type.as_str(),
                insight.message,
                insight.confidence,
                if insight.actionable { 1 } else { 0 },
                now,
            ],
        )?;
        Ok(id)
    }

    pub fn list_insights(&self, actionable_only: bool, limit: i64) -> SqliteResult<Vec<Insight>> {
        let conn = self.conn();
        let sql = if actionable_only {
            "SELECT id, insight_type, message, confidence, actionable, is_read, created_at
             FROM insights WHERE actionable = 1 ORDER BY created_at DESC LIMIT ?1"
        } else {
            "SELECT id, insight_type, message, confidence, actionable, is_read, created_at
             FROM insights ORDER BY created_at DESC LIMIT ?1"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([limit], map_insight)?;
        rows.collect()
    }

    pub fn mark_insight_read(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let rows_affected =
            conn.execute("UPDATE insights SET is_read = 1 WHERE id = ?1", [id])?;
        Ok(rows_affected > 0)
    }
}
