use rusqlite::params;
use smartcrm_core::Note;

use super::{Storage, get_conn, parse_ts, ts};
use crate::error::StorageError;

impl Storage {
    pub fn insert_note(&self, note: &Note) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO notes (id, contact_id, user_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![note.id, note.contact_id, note.user_id, note.content, ts(&note.created_at)],
        )?;
        Ok(())
    }

    pub fn list_notes_for_contact(&self, contact_id: &str) -> Result<Vec<Note>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, contact_id, user_id, content, created_at
               FROM notes WHERE contact_id = ?1
              ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![contact_id], |row| {
            Ok(Note {
                id: row.get(0)?,
                contact_id: row.get(1)?,
                user_id: row.get(2)?,
                content: row.get(3)?,
                created_at: parse_ts(row, 4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
