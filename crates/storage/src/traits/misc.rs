use async_trait::async_trait;
use smartcrm_core::{ActivityLog, Note};

use crate::error::StorageError;

/// Contact notes. Append-only.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn insert_note(&self, note: &Note) -> Result<(), StorageError>;

    /// Notes of one contact, newest first.
    async fn list_notes_for_contact(&self, contact_id: &str) -> Result<Vec<Note>, StorageError>;
}

/// Audit trail. Append-only.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn append_activity(&self, entry: &ActivityLog) -> Result<(), StorageError>;

    /// Page of entries, newest first.
    async fn list_activity(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ActivityLog>, StorageError>;
}
