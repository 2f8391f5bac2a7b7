//! Database operations for the `contacts` table

use chrono::Utc;
use rusqlite::Result as SqliteResult;
use uuid::Uuid;

use crate::db::Database;
use crate::models::{CallType, Contact, ContactUpdate, NewContact};

const CONTACT_COLUMNS: &str = "id, phone_number, name, contact_type, is_whitelisted, is_blocked,
     call_count, last_call_date, notes";

fn map_contact(row: &rusqlite::Row<'_>) -> SqliteResult<Contact> {
    let contact_type: String = row.get(3)?;
    Ok(Contact {
        id: row.get(0)?,
        phone_number: row.get(1)?,
        name: row.get(2)?,
        contact_type: CallType::from_str(&contact_type).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unexpected enum value: {}", contact_type).into(),
            )
        })?,
        is_whitelisted: row.get::<_, i64>(4)? != 0,
        is_blocked: row.get::<_, i64>(5)? != 0,
        call_count: row.get(6)?,
        last_call_date: row.get(7)?,
        notes: row.get(8)?,
    })
}

impl Database {
    pub fn insert_contact(&self, contact: &NewContact) -> SqliteResult<String> {
        let conn = self.conn();
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO contacts (
                id, phone_number, name, contact_type, is_whitelisted, is_blocked,
                call_count, last_call_date, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8)",
            rusqlite::params![
                id,
                contact.phone_number,
                contact.name,
                contact.contact_type.as_str(),
                if contact.is_whitelisted { 1 } else { 0 },
                if contact.is_blocked { 1 } else { 0 },
                now,
                contact.notes,
            ],
        )?;

        Ok(id)
    }

    pub fn get_contact(&self, id: &str) -> SqliteResult<Option<Contact>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM contacts WHERE id = ?1",
            CONTACT_COLUMNS
        ))?;
        match stmt.query_row([id], map_contact) {
            Ok(contact) => Ok(Some(contact)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn contact_exists(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM contacts WHERE id = ?1)",
            [id],
            |row| row.get::<_, i64>(0),
        )
        .map(|n| n != 0)
    }

    pub fn get_contact_by_phone(&self, phone_number: &str) -> SqliteResult<Option<Contact>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM contacts WHERE phone_number = ?1 LIMIT 1",
            CONTACT_COLUMNS
        ))?;
        match stmt.query_row([phone_number], map_contact) {
            Ok(contact) => Ok(Some(contact)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// List contacts, optionally filtered by type or a name/number search term.
    pub fn list_contacts(
        &self,
        contact_type: Option<CallType>,
        search: Option<&str>,
    ) -> SqliteResult<Vec<Contact>> {
        let conn = self.conn();

        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(t) = contact_type {
            params.push(Box::new(t.as_str()));
            clauses.push(format!("contact_type = ?{}", params.len()));
        }
        if let Some(term) = search {
            let pattern = format!("%{}%", term);
            params.push(Box::new(pattern.clone()));
            let name_idx = params.len();
            params.push(Box::new(pattern));
            clauses.push(format!(
                "(name LIKE ?{} COLLATE NOCASE OR phone_number LIKE ?{})",
                name_idx,
                params.len()
            ));
        }

        let mut sql = format!("SELECT {} FROM contacts", CONTACT_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY phone_number");

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), map_contact)?;
        rows.collect()
    }

    pub fn update_contact(&self, id: &str, update: &ContactUpdate) -> SqliteResult<Option<Contact>> {
        let conn = self.conn();

        let mut sets: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(name) = &update.name {
            params.push(Box::new(name.clone()));
            sets.push(format!("name = ?{}", params.len()));
        }
        if let Some(w) = update.is_whitelisted {
            params.push(Box::new(if w { 1 } else { 0 }));
            sets.push(format!("is_whitelisted = ?{}", params.len()));
        }
        if let Some(b) = update.is_blocked {
            params.push(Box::new(if b { 1 } else { 0 }));
            sets.push(format!("is_blocked = ?{}", params.len()));
        }
        if let Some(notes) = &update.notes {
            params.push(Box::new(notes.clone()));
            sets.push(format!("notes = ?{}", params.len()));
        }

        if sets.is_empty() {
            drop(conn);
            return self.get_contact(id);
        }

        params.push(Box::new(id.to_string()));
        let sql = format!(
            "UPDATE contacts SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );
        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_ref.as_slice())?;

        drop(conn);
        self.get_contact(id)
    }

    /// Bump call_count and last_call_date after a call referencing this
    /// contact is recorded. Best-effort: the call insert has already
    /// committed and there is no cross-table transaction to roll back.
    pub fn increment_contact_call_count(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn();
        let now = Utc::now().to_rfc3339();
        let rows_affected = conn.execute(
            "UPDATE contacts SET call_count = call_count + 1, last_call_date = ?1 WHERE id = ?2",
            rusqlite::params![now, id],
        )?;
        Ok(rows_affected > 0)
    }
}
