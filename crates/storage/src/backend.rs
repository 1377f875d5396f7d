//! Unified storage backend with enum dispatch.

#[cfg(feature = "sqlite")]
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use smartcrm_core::{
    ActivityLog, Contact, ContactCounts, ContactQuery, Demo, FollowUp, FollowUpStatus, Meeting,
    MeetingStatus, Note, User, UserRecord,
};

use crate::error::StorageError;
use crate::traits::{
    ActivityStore, ContactStore, DemoStore, FollowUpStore, MeetingStore, NoteStore, UserStore,
};

macro_rules! dispatch {
    ($self:expr, $trait:path, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite(s) => <crate::Storage as $trait>::$method(s, $($arg),*).await,
            #[cfg(feature = "postgres")]
            StorageBackend::Postgres(s) => <crate::pg_storage::PgStorage as $trait>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Clone, Debug)]
pub enum StorageBackend {
    #[cfg(feature = "sqlite")]
    Sqlite(crate::Storage),
    #[cfg(feature = "postgres")]
    Postgres(crate::pg_storage::PgStorage),
}

impl StorageBackend {
    #[cfg(feature = "sqlite")]
    pub fn new_sqlite(db_path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Migration(format!("cannot create {}: {e}", parent.display())))?;
        }
        Ok(Self::Sqlite(crate::Storage::new(db_path)?))
    }

    #[cfg(feature = "postgres")]
    pub async fn new_postgres(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::Postgres(crate::pg_storage::PgStorage::new(database_url).await?))
    }

    /// Short backend name for logs and the version endpoint.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => "sqlite",
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => "postgres",
        }
    }
}

// ── UserStore ────────────────────────────────────────────────────

#[async_trait]
impl UserStore for StorageBackend {
    async fn create_user(&self, record: &UserRecord) -> Result<(), StorageError> {
        dispatch!(self, UserStore, create_user(record))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        dispatch!(self, UserStore, get_user_by_email(email))
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        dispatch!(self, UserStore, get_user(id))
    }
}

// ── ContactStore ─────────────────────────────────────────────────

#[async_trait]
impl ContactStore for StorageBackend {
    async fn insert_contact(&self, contact: &Contact) -> Result<(), StorageError> {
        dispatch!(self, ContactStore, insert_contact(contact))
    }

    async fn get_contact(&self, id: &str) -> Result<Option<Contact>, StorageError> {
        dispatch!(self, ContactStore, get_contact(id))
    }

    async fn get_contact_by_phone(&self, phone: &str) -> Result<Option<Contact>, StorageError> {
        dispatch!(self, ContactStore, get_contact_by_phone(phone))
    }

    async fn contact_phone_exists(&self, phone: &str) -> Result<bool, StorageError> {
        dispatch!(self, ContactStore, contact_phone_exists(phone))
    }

    async fn get_contacts_by_ids(&self, ids: &[String]) -> Result<Vec<Contact>, StorageError> {
        dispatch!(self, ContactStore, get_contacts_by_ids(ids))
    }

    async fn list_contacts(&self, query: &ContactQuery) -> Result<Vec<Contact>, StorageError> {
        dispatch!(self, ContactStore, list_contacts(query))
    }

    async fn count_contacts(&self) -> Result<ContactCounts, StorageError> {
        dispatch!(self, ContactStore, count_contacts())
    }

    async fn update_contact(&self, contact: &Contact) -> Result<bool, StorageError> {
        dispatch!(self, ContactStore, update_contact(contact))
    }

    async fn delete_contact(&self, id: &str) -> Result<bool, StorageError> {
        dispatch!(self, ContactStore, delete_contact(id))
    }

    async fn record_call(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        dispatch!(self, ContactStore, record_call(id, at))
    }
}

// ── NoteStore / ActivityStore ────────────────────────────────────

#[async_trait]
impl NoteStore for StorageBackend {
    async fn insert_note(&self, note: &Note) -> Result<(), StorageError> {
        dispatch!(self, NoteStore, insert_note(note))
    }

    async fn list_notes_for_contact(&self, contact_id: &str) -> Result<Vec<Note>, StorageError> {
        dispatch!(self, NoteStore, list_notes_for_contact(contact_id))
    }
}

#[async_trait]
impl ActivityStore for StorageBackend {
    async fn append_activity(&self, entry: &ActivityLog) -> Result<(), StorageError> {
        dispatch!(self, ActivityStore, append_activity(entry))
    }

    async fn list_activity(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ActivityLog>, StorageError> {
        dispatch!(self, ActivityStore, list_activity(offset, limit))
    }
}

// ── FollowUpStore ────────────────────────────────────────────────

#[async_trait]
impl FollowUpStore for StorageBackend {
    async fn insert_followup(&self, followup: &FollowUp) -> Result<(), StorageError> {
        dispatch!(self, FollowUpStore, insert_followup(followup))
    }

    async fn get_followup(&self, id: &str) -> Result<Option<FollowUp>, StorageError> {
        dispatch!(self, FollowUpStore, get_followup(id))
    }

    async fn list_followups(
        &self,
        status: Option<FollowUpStatus>,
    ) -> Result<Vec<FollowUp>, StorageError> {
        dispatch!(self, FollowUpStore, list_followups(status))
    }

    async fn list_pending_followups(
        &self,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<FollowUp>, StorageError> {
        dispatch!(self, FollowUpStore, list_pending_followups(window, offset, limit))
    }

    async fn list_unnotified_due(
        &self,
        due_before: DateTime<Utc>,
    ) -> Result<Vec<FollowUp>, StorageError> {
        dispatch!(self, FollowUpStore, list_unnotified_due(due_before))
    }

    async fn complete_followup(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        dispatch!(self, FollowUpStore, complete_followup(id, at))
    }

    async fn mark_followup_notified(&self, id: &str) -> Result<bool, StorageError> {
        dispatch!(self, FollowUpStore, mark_followup_notified(id))
    }
}

// ── MeetingStore ─────────────────────────────────────────────────

#[async_trait]
impl MeetingStore for StorageBackend {
    async fn insert_meeting(&self, meeting: &Meeting) -> Result<(), StorageError> {
        dispatch!(self, MeetingStore, insert_meeting(meeting))
    }

    async fn get_meeting(&self, user_id: &str, id: &str) -> Result<Option<Meeting>, StorageError> {
        dispatch!(self, MeetingStore, get_meeting(user_id, id))
    }

    async fn list_meetings(
        &self,
        user_id: &str,
        status: Option<MeetingStatus>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Meeting>, StorageError> {
        dispatch!(self, MeetingStore, list_meetings(user_id, status, offset, limit))
    }

    async fn update_meeting(&self, meeting: &Meeting) -> Result<bool, StorageError> {
        dispatch!(self, MeetingStore, update_meeting(meeting))
    }

    async fn delete_meeting(&self, user_id: &str, id: &str) -> Result<bool, StorageError> {
        dispatch!(self, MeetingStore, delete_meeting(user_id, id))
    }
}

// ── DemoStore ────────────────────────────────────────────────────

#[async_trait]
impl DemoStore for StorageBackend {
    async fn insert_demo(&self, demo: &Demo) -> Result<(), StorageError> {
        dispatch!(self, DemoStore, insert_demo(demo))
    }

    async fn get_demo(&self, id: &str) -> Result<Option<Demo>, StorageError> {
        dispatch!(self, DemoStore, get_demo(id))
    }

    async fn find_active_demo(&self, contact_id: &str) -> Result<Option<Demo>, StorageError> {
        dispatch!(self, DemoStore, find_active_demo(contact_id))
    }

    async fn mark_demo_watched(
        &self,
        id: &str,
        watched_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        dispatch!(self, DemoStore, mark_demo_watched(id, watched_at, now))
    }

    async fn list_demos_for_contact(&self, contact_id: &str) -> Result<Vec<Demo>, StorageError> {
        dispatch!(self, DemoStore, list_demos_for_contact(contact_id))
    }

    async fn list_demos_given_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Demo>, StorageError> {
        dispatch!(self, DemoStore, list_demos_given_between(start, end))
    }
}
