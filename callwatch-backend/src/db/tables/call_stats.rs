//! Database operations for the `call_stats` table
//! A single aggregated snapshot, replaced wholesale on recompute.

use chrono::Utc;
use rusqlite::Result as SqliteResult;
use uuid::Uuid;

use crate::db::{json_col, to_json_col, Database};
use crate::models::CallStats;

impl Database {
    /// Aggregate the `calls` table into a fresh stats snapshot.
    /// Change deltas are zero here; `replace_call_stats` fills them in
    /// against the previous snapshot.
    pub fn compute_call_stats(&self) -> SqliteResult<CallStats> {
        let conn = self.conn();

        let (total, personal, business, spam, spam_blocked, allowed, blocked, avg_duration) = conn
            .query_row(
                "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN call_type = 'personal' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN call_type = 'business' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN is_spam = 1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN is_spam = 1 AND status = 'blocked' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'allowed' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'blocked' THEN 1 ELSE 0 END), 0),
                    COALESCE(AVG(duration), 0.0)
                 FROM calls",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                        row.get::<_, i64>(6)?,
                        row.get::<_, f64>(7)?,
                    ))
                },
            )?;

        let mut stmt = conn.prepare(
            "SELECT phone_number FROM calls WHERE is_spam = 1
             GROUP BY phone_number ORDER BY COUNT(*) DESC LIMIT 5",
        )?;
        let top_spam_numbers: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<SqliteResult<_>>()?;

        let spam_percentage = if total > 0 {
            spam as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Ok(CallStats {
            total_calls: total,
            personal_calls: personal,
            business_calls: business,
            spam_blocked,
            spam_percentage,
            allowed_calls: allowed,
            blocked_calls: blocked,
            avg_call_duration: avg_duration,
            top_spam_numbers,
            calls_change: 0,
            spam_change: 0,
            calculated_at: Utc::now().to_rfc3339(),
        })
    }

    pub fn latest_call_stats(&self) -> SqliteResult<Option<CallStats>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT total_calls, personal_calls, business_calls, spam_blocked, spam_percentage,
                    allowed_calls, blocked_calls, avg_call_duration, top_spam_numbers,
                    calls_change, spam_change, calculated_at
             FROM call_stats ORDER BY calculated_at DESC LIMIT 1",
        )?;
        let result = stmt.query_row([], |row| {
            Ok(CallStats {
                total_calls: row.get(0)?,
                personal_calls: row.get(1)?,
                business_calls: row.get(2)?,
                spam_blocked: row.get(3)?,
                spam_percentage: row.get(4)?,
                allowed_calls: row.get(5)?,
                blocked_calls: row.get(6)?,
                avg_call_duration: row.get(7)?,
                top_spam_numbers: json_col(row, 8)?,
                calls_change: row.get(9)?,
                spam_change: row.get(10)?,
                calculated_at: row.get(11)?,
            })
        });
        match result {
            Ok(stats) => Ok(Some(stats)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Recompute and store a snapshot, replacing any previous one.
    /// Change fields are deltas against the replaced snapshot.
    pub fn replace_call_stats(&self) -> SqliteResult<CallStats> {
        let previous = self.latest_call_stats()?;
        let mut stats = self.compute_call_stats()?;

        if let Some(prev) = previous {
            stats.calls_change = stats.total_calls - prev.total_calls;
            stats.spam_change = stats.spam_blocked - prev.spam_blocked;
        }

        let top_spam = to_json_col(&stats.top_spam_numbers)?;
        let conn = self.conn();
        conn.execute("DELETE FROM call_stats", [])?;
        conn.execute(
            "INSERT INTO call_stats (
                id, total_calls, personal_calls, business_calls, spam_blocked, spam_percentage,
                allowed_calls, blocked_calls, avg_call_duration, top_spam_numbers,
                calls_change, spam_change, calculated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                Uuid::new_v4().to_string(),
                stats.total_calls,
                stats.personal_calls,
                stats.business_calls,
                stats.spam_blocked,
                stats.spam_percentage,
                stats.allowed_calls,
                stats.blocked_calls,
                stats.avg_call_duration,
                top_spam,
                stats.calls_change,
                stats.spam_change,
                stats.calculated_at,
            ],
        )?;

        Ok(stats)
    }
}
