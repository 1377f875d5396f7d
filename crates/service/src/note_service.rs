use std::sync::Arc;

use chrono::Utc;
use smartcrm_core::{ActivityLog, AuthUser, Note, NoteInput, actions};
use smartcrm_storage::StorageBackend;
use smartcrm_storage::traits::{ContactStore, NoteStore};

use crate::{ActivityService, ServiceError};

pub struct NoteService {
    storage: Arc<StorageBackend>,
    activity: Arc<ActivityService>,
}

impl NoteService {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>, activity: Arc<ActivityService>) -> Self {
        Self { storage, activity }
    }

    pub async fn create(&self, input: NoteInput, user: &AuthUser) -> Result<Note, ServiceError> {
        let now = Utc::now();
        let note = Note::new(input, &user.id, now)?;
        let contact = self
            .storage
            .get_contact(&note.contact_id)
            .await?
            .ok_or(ServiceError::NotFound("Contact"))?;
        self.storage.insert_note(&note).await?;

        self.activity
            .record(ActivityLog::new(user, actions::ADDED_NOTE, now).target(contact.phone))
            .await?;
        Ok(note)
    }

    pub async fn list_for_contact(&self, contact_id: &str) -> Result<Vec<Note>, ServiceError> {
        Ok(self.storage.list_notes_for_contact(contact_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use smartcrm_storage::traits::ActivityStore;

    use super::*;
    use crate::test_support::{create_test_backend, insert_contact, test_user};

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn note_requires_contact_and_logs_phone() {
        let (storage, _dir) = create_test_backend();
        let notes = NoteService::new(Arc::clone(&storage), Arc::new(ActivityService::new(Arc::clone(&storage))));
        let user = test_user();

        let orphan = NoteInput { contact_id: "missing".to_owned(), content: "hi".to_owned() };
        assert!(notes.create(orphan, &user).await.unwrap_err().is_not_found());

        let contact = insert_contact(&storage, "9000000009", "Shop").await;
        let input = NoteInput { contact_id: contact.id.clone(), content: "  wants a demo  ".to_owned() };
        let note = notes.create(input, &user).await.unwrap();
        assert_eq!(note.content, "wants a demo");

        let listed = notes.list_for_contact(&contact.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, note.id);
        let log = storage.list_activity(0, 10).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].target.as_deref(), Some("9000000009"));
    }
}
