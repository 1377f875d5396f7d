use async_trait::async_trait;
use smartcrm_core::Note;
use sqlx::Row;

use super::PgStorage;
use crate::error::StorageError;
use crate::traits::NoteStore;

#[async_trait]
impl NoteStore for PgStorage {
    async fn insert_note(&self, note: &Note) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO notes (id, contact_id, user_id, content, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&note.id)
        .bind(&note.contact_id)
        .bind(&note.user_id)
        .bind(&note.content)
        .bind(note.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_notes_for_contact(&self, contact_id: &str) -> Result<Vec<Note>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, contact_id, user_id, content, created_at
               FROM notes WHERE contact_id = $1
              ORDER BY created_at DESC, id DESC",
        )
        .bind(contact_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| -> Result<Note, StorageError> {
                Ok(Note {
                    id: row.try_get("id")?,
                    contact_id: row.try_get("contact_id")?,
                    user_id: row.try_get("user_id")?,
                    content: row.try_get("content")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}
