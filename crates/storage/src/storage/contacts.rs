use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, ToSql, params};
use smartcrm_core::{Contact, ContactCounts, ContactQuery};

use super::{Storage, escape_like_pattern, get_conn, opt_ts, parse_json, parse_opt_ts, parse_text, parse_ts, ts};
use crate::error::StorageError;

const CONTACT_COLUMNS: &str =
    "id, phone, customer_name, status, data, created_at, updated_at, last_call_at";

/// Matches phone, customer name or any attribute value.
const SEARCH_CLAUSE: &str = " AND (phone LIKE ? ESCAPE '\\'
        OR customer_name LIKE ? ESCAPE '\\'
        OR EXISTS (SELECT 1 FROM json_each(contacts.data) WHERE json_each.value LIKE ? ESCAPE '\\'))";

impl Storage {
    /// Insert contact.
    ///
    /// # Errors
    /// Returns `Duplicate` if the phone number is taken.
    pub fn insert_contact(&self, contact: &Contact) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            &format!("INSERT INTO contacts ({CONTACT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
            params![
                contact.id,
                contact.phone,
                contact.customer_name,
                contact.status.as_str(),
                serde_json::to_string(&contact.data)?,
                ts(&contact.created_at),
                ts(&contact.updated_at),
                opt_ts(contact.last_call_at.as_ref()),
            ],
        )?;
        Ok(())
    }

    pub fn get_contact(&self, id: &str) -> Result<Option<Contact>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let contact = conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                params![id],
                Self::row_to_contact,
            )
            .optional()?;
        Ok(contact)
    }

    pub fn get_contact_by_phone(&self, phone: &str) -> Result<Option<Contact>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let contact = conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE phone = ?1"),
                params![phone],
                Self::row_to_contact,
            )
            .optional()?;
        Ok(contact)
    }

    pub fn contact_phone_exists(&self, phone: &str) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM contacts WHERE phone = ?1)",
            params![phone],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub fn get_contacts_by_ids(&self, ids: &[String]) -> Result<Vec<Contact>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        // One JSON array parameter keeps large id sets under SQLite's bind-variable limit.
        let ids_json = serde_json::to_string(ids)?;
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id IN (SELECT value FROM json_each(?1))"
        ))?;
        let rows = stmt.query_map(params![ids_json], Self::row_to_contact)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Filtered page of contacts, newest first.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_contacts(&self, query: &ContactQuery) -> Result<Vec<Contact>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like_pattern(s)));
        let status = query.status.map(|s| s.as_str());
        let limit = query.limit as i64;
        let offset = query.offset as i64;

        let mut sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE 1 = 1");
        let mut args: Vec<&dyn ToSql> = Vec::new();
        if let Some(pattern) = &pattern {
            sql.push_str(SEARCH_CLAUSE);
            args.extend([pattern as &dyn ToSql, pattern, pattern]);
        }
        if let Some(status) = &status {
            sql.push_str(" AND status = ?");
            args.push(status);
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
        args.push(&limit);
        args.push(&offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(args.as_slice(), Self::row_to_contact)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_contacts(&self) -> Result<ContactCounts, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM contacts GROUP BY status")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;
        let mut by_status = BTreeMap::new();
        let mut total = 0u64;
        for row in rows {
            let (status, count) = row?;
            let count = count as u64;
            total += count;
            by_status.insert(status, count);
        }
        Ok(ContactCounts { total, by_status })
    }

    /// Persist every mutable contact field.
    ///
    /// # Errors
    /// Returns `Duplicate` if the new phone number belongs to another contact.
    pub fn update_contact(&self, contact: &Contact) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE contacts SET phone = ?1, customer_name = ?2, status = ?3, data = ?4,
                    updated_at = ?5, last_call_at = ?6
              WHERE id = ?7",
            params![
                contact.phone,
                contact.customer_name,
                contact.status.as_str(),
                serde_json::to_string(&contact.data)?,
                ts(&contact.updated_at),
                opt_ts(contact.last_call_at.as_ref()),
                contact.id,
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_contact(&self, id: &str) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    pub fn record_call(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let stamp = ts(&at);
        let affected = conn.execute(
            "UPDATE contacts SET last_call_at = ?1, updated_at = ?1 WHERE id = ?2",
            params![stamp, id],
        )?;
        Ok(affected > 0)
    }

    fn row_to_contact(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
        Ok(Contact {
            id: row.get(0)?,
            phone: row.get(1)?,
            customer_name: row.get(2)?,
            status: parse_text(row, 3)?,
            data: parse_json(row, 4)?,
            created_at: parse_ts(row, 5)?,
            updated_at: parse_ts(row, 6)?,
            last_call_at: parse_opt_ts(row, 7)?,
        })
    }
}
