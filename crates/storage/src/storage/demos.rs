use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, params};
use smartcrm_core::Demo;

use super::{Storage, get_conn, opt_ts, parse_opt_ts, parse_ts, ts};
use crate::error::StorageError;

const DEMO_COLUMNS: &str =
    "id, contact_id, user_id, user_email, given_at, watched, watched_at, notes, created_at, updated_at";

impl Storage {
    /// Insert demo.
    ///
    /// # Errors
    /// Returns `Duplicate` if the contact already has an unwatched demo.
    pub fn insert_demo(&self, demo: &Demo) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            &format!(
                "INSERT INTO demos ({DEMO_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                demo.id,
                demo.contact_id,
                demo.user_id,
                demo.user_email,
                ts(&demo.given_at),
                demo.watched,
                opt_ts(demo.watched_at.as_ref()),
                demo.notes,
                ts(&demo.created_at),
                ts(&demo.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_demo(&self, id: &str) -> Result<Option<Demo>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let demo = conn
            .query_row(
                &format!("SELECT {DEMO_COLUMNS} FROM demos WHERE id = ?1"),
                params![id],
                Self::row_to_demo,
            )
            .optional()?;
        Ok(demo)
    }

    pub fn find_active_demo(&self, contact_id: &str) -> Result<Option<Demo>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let demo = conn
            .query_row(
                &format!(
                    "SELECT {DEMO_COLUMNS} FROM demos WHERE contact_id = ?1 AND watched = 0 LIMIT 1"
                ),
                params![contact_id],
                Self::row_to_demo,
            )
            .optional()?;
        Ok(demo)
    }

    pub fn mark_demo_watched(
        &self,
        id: &str,
        watched_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE demos SET watched = 1, watched_at = ?1, updated_at = ?2 WHERE id = ?3",
            params![ts(&watched_at), ts(&now), id],
        )?;
        Ok(affected > 0)
    }

    pub fn list_demos_for_contact(&self, contact_id: &str) -> Result<Vec<Demo>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {DEMO_COLUMNS} FROM demos WHERE contact_id = ?1 ORDER BY given_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![contact_id], Self::row_to_demo)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_demos_given_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Demo>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {DEMO_COLUMNS} FROM demos
              WHERE given_at >= ?1 AND given_at <= ?2
              ORDER BY given_at ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![ts(&start), ts(&end)], Self::row_to_demo)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn row_to_demo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Demo> {
        Ok(Demo {
            id: row.get(0)?,
            contact_id: row.get(1)?,
            user_id: row.get(2)?,
            user_email: row.get(3)?,
            given_at: parse_ts(row, 4)?,
            watched: row.get(5)?,
            watched_at: parse_opt_ts(row, 6)?,
            notes: row.get(7)?,
            created_at: parse_ts(row, 8)?,
            updated_at: parse_ts(row, 9)?,
        })
    }
}
