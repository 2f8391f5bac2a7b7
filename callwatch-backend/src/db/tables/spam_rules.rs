//! Database operations for the `spam_rules` table

use rusqlite::Result as SqliteResult;
use uuid::Uuid;

use crate::db::Database;
use crate::models::{NewSpamRule, SpamRule, SpamRuleUpdate};

fn map_rule(row: &rusqlite::Row<'_>) -> SqliteResult<SpamRule> {
    Ok(SpamRule {
        id: row.get(0)?,
        name: row.get(1)?,
        pattern: row.get(2)?,
        is_active: row.get::<_, i64>(3)? != 0,
        confidence: row.get(4)?,
        description: row.get(5)?,
    })
}

impl Database {
    pub fn insert_spam_rule(&self, rule: &NewSpamRule) -> SqliteResult<String> {
        let conn = self.conn();
        let id = Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO spam_rules (id, name, pattern, is_active, confidence, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                id,
                rule.name,
                rule.pattern,
                if rule.is_active { 1 } else { 0 },
                rule.confidence,
                rule.description,
            ],
        )?;
        Ok(id)
    }

    pub fn get_spam_rule(&self, id: &str) -> SqliteResult<Option<SpamRule>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, pattern, is_active, confidence, description
             FROM spam_rules WHERE id = ?1",
        )?;
        match stmt.query_row([id], map_rule) {
            Ok(rule) => Ok(Some(rule)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn list_spam_rules(&self, active_only: bool) -> SqliteResult<Vec<SpamRule>> {
        let conn = self.conn();
        let sql = if active_only {
            "SELECT id, name, pattern, is_active, confidence, description
             FROM spam_rules WHERE is_active = 1 ORDER BY name"
        } else {
            "SELECT id, name, pattern, is_active, confidence, description
             FROM spam_rules ORDER BY name"
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], map_rule)?;
        rows.collect()
    }

    pub fn update_spam_rule(
        &self,
        id: &str,
        update: &SpamRuleUpdate,
    ) -> SqliteResult<Option<SpamRule>> {
        let conn = self.conn();

        let mut sets: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(name) = &update.name {
            params.push(Box::new(name.clone()));
            sets.push(format!("name = ?{}", params.len()));
        }
        if let Some(pattern) = &update.pattern {
            params.push(Box::new(pattern.clone()));
            sets.push(format!("pattern = ?{}", params.len()));
        }
        if let Some(active) = update.is_active {
            params.push(Box::new(if active { 1 } else { 0 }));
            sets.push(format!("is_active = ?{}", params.len()));
        }
        if let Some(confidence) = update.confidence {
            params.push(Box::new(confidence));
            sets.push(format!("confidence = ?{}", params.len()));
        }
        if let Some(description) = &update.description {
            params.push(Box::new(description.clone()));
            sets.push(format!("description = ?{}", params.len()));
        }

        if sets.is_empty() {
            drop(conn);
            return self.get_spam_rule(id);
        }

        params.push(Box::new(id.to_string()));
        let sql = format!(
            "UPDATE spam_rules SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_ref.as_slice())?;

        drop(conn);
        self.get_spam_rule(id)
    }
}
