//! Async trait implementations for SQLite `Storage` via `spawn_blocking`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use smartcrm_core::{
    ActivityLog, Contact, ContactCounts, ContactQuery, Demo, FollowUp, FollowUpStatus, Meeting,
    MeetingStatus, Note, User, UserRecord,
};

use crate::Storage;
use crate::error::StorageError;
use crate::traits::{
    ActivityStore, ContactStore, DemoStore, FollowUpStore, MeetingStore, NoteStore, UserStore,
};

/// Helper: run a blocking closure on the tokio blocking pool.
async fn blocking<F, T>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Blocking(format!("spawn_blocking join error: {e}")))?
}

/// Body-generating macro for async-to-blocking delegation.
///
/// Each argument is annotated with a capture kind:
/// - `@ref arg`      => `.clone()` a `&T`, pass as `&arg`
/// - `@str arg`      => `.to_owned()` a `&str`, pass as `&arg`
/// - `@slice arg`    => `.to_vec()` a `&[T]`, pass as `&arg`
/// - `@val arg`      => move directly (Copy/owned types)
macro_rules! delegate {
    ($self:ident, $method:ident $(, @$kind:ident $arg:ident)*) => {{
        let s = $self.clone();
        $(delegate!(@capture $kind $arg);)*
        blocking(move || s.$method($(delegate!(@pass $kind $arg)),*)).await
    }};
    (@capture ref $arg:ident) => { let $arg = $arg.clone(); };
    (@capture str $arg:ident) => { let $arg = $arg.to_owned(); };
    (@capture slice $arg:ident) => { let $arg = $arg.to_vec(); };
    (@capture val $arg:ident) => { };
    (@pass ref $arg:ident) => { &$arg };
    (@pass str $arg:ident) => { &$arg };
    (@pass slice $arg:ident) => { &$arg };
    (@pass val $arg:ident) => { $arg };
}

// ── UserStore ────────────────────────────────────────────────────

#[async_trait]
impl UserStore for Storage {
    async fn create_user(&self, record: &UserRecord) -> Result<(), StorageError> {
        delegate!(self, create_user, @ref record)
    }
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        delegate!(self, get_user_by_email, @str email)
    }
    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        delegate!(self, get_user, @str id)
    }
}

// ── ContactStore ─────────────────────────────────────────────────

#[async_trait]
impl ContactStore for Storage {
    async fn insert_contact(&self, contact: &Contact) -> Result<(), StorageError> {
        delegate!(self, insert_contact, @ref contact)
    }
    async fn get_contact(&self, id: &str) -> Result<Option<Contact>, StorageError> {
        delegate!(self, get_contact, @str id)
    }
    async fn get_contact_by_phone(&self, phone: &str) -> Result<Option<Contact>, StorageError> {
        delegate!(self, get_contact_by_phone, @str phone)
    }
    async fn contact_phone_exists(&self, phone: &str) -> Result<bool, StorageError> {
        delegate!(self, contact_phone_exists, @str phone)
    }
    async fn get_contacts_by_ids(&self, ids: &[String]) -> Result<Vec<Contact>, StorageError> {
        delegate!(self, get_contacts_by_ids, @slice ids)
    }
    async fn list_contacts(&self, query: &ContactQuery) -> Result<Vec<Contact>, StorageError> {
        delegate!(self, list_contacts, @ref query)
    }
    async fn count_contacts(&self) -> Result<ContactCounts, StorageError> {
        delegate!(self, count_contacts)
    }
    async fn update_contact(&self, contact: &Contact) -> Result<bool, StorageError> {
        delegate!(self, update_contact, @ref contact)
    }
    async fn delete_contact(&self, id: &str) -> Result<bool, StorageError> {
        delegate!(self, delete_contact, @str id)
    }
    async fn record_call(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        delegate!(self, record_call, @str id, @val at)
    }
}

// ── NoteStore / ActivityStore ────────────────────────────────────

#[async_trait]
impl NoteStore for Storage {
    async fn insert_note(&self, note: &Note) -> Result<(), StorageError> {
        delegate!(self, insert_note, @ref note)
    }
    async fn list_notes_for_contact(&self, contact_id: &str) -> Result<Vec<Note>, StorageError> {
        delegate!(self, list_notes_for_contact, @str contact_id)
    }
}

#[async_trait]
impl ActivityStore for Storage {
    async fn append_activity(&self, entry: &ActivityLog) -> Result<(), StorageError> {
        delegate!(self, append_activity, @ref entry)
    }
    async fn list_activity(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ActivityLog>, StorageError> {
        delegate!(self, list_activity, @val offset, @val limit)
    }
}

// ── FollowUpStore ────────────────────────────────────────────────

#[async_trait]
impl FollowUpStore for Storage {
    async fn insert_followup(&self, followup: &FollowUp) -> Result<(), StorageError> {
        delegate!(self, insert_followup, @ref followup)
    }
    async fn get_followup(&self, id: &str) -> Result<Option<FollowUp>, StorageError> {
        delegate!(self, get_followup, @str id)
    }
    async fn list_followups(
        &self,
        status: Option<FollowUpStatus>,
    ) -> Result<Vec<FollowUp>, StorageError> {
        delegate!(self, list_followups, @val status)
    }
    async fn list_pending_followups(
        &self,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<FollowUp>, StorageError> {
        delegate!(self, list_pending_followups, @val window, @val offset, @val limit)
    }
    async fn list_unnotified_due(
        &self,
        due_before: DateTime<Utc>,
    ) -> Result<Vec<FollowUp>, StorageError> {
        delegate!(self, list_unnotified_due, @val due_before)
    }
    async fn complete_followup(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        delegate!(self, complete_followup, @str id, @val at)
    }
    async fn mark_followup_notified(&self, id: &str) -> Result<bool, StorageError> {
        delegate!(self, mark_followup_notified, @str id)
    }
}

// ── MeetingStore ─────────────────────────────────────────────────

#[async_trait]
impl MeetingStore for Storage {
    async fn insert_meeting(&self, meeting: &Meeting) -> Result<(), StorageError> {
        delegate!(self, insert_meeting, @ref meeting)
    }
    async fn get_meeting(&self, user_id: &str, id: &str) -> Result<Option<Meeting>, StorageError> {
        delegate!(self, get_meeting, @str user_id, @str id)
    }
    async fn list_meetings(
        &self,
        user_id: &str,
        status: Option<MeetingStatus>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Meeting>, StorageError> {
        delegate!(self, list_meetings, @str user_id, @val status, @val offset, @val limit)
    }
    async fn update_meeting(&self, meeting: &Meeting) -> Result<bool, StorageError> {
        delegate!(self, update_meeting, @ref meeting)
    }
    async fn delete_meeting(&self, user_id: &str, id: &str) -> Result<bool, StorageError> {
        delegate!(self, delete_meeting, @str user_id, @str id)
    }
}

// ── DemoStore ────────────────────────────────────────────────────

#[async_trait]
impl DemoStore for Storage {
    async fn insert_demo(&self, demo: &Demo) -> Result<(), StorageError> {
        delegate!(self, insert_demo, @ref demo)
    }
    async fn get_demo(&self, id: &str) -> Result<Option<Demo>, StorageError> {
        delegate!(self, get_demo, @str id)
    }
    async fn find_active_demo(&self, contact_id: &str) -> Result<Option<Demo>, StorageError> {
        delegate!(self, find_active_demo, @str contact_id)
    }
    async fn mark_demo_watched(
        &self,
        id: &str,
        watched_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        delegate!(self, mark_demo_watched, @str id, @val watched_at, @val now)
    }
    async fn list_demos_for_contact(&self, contact_id: &str) -> Result<Vec<Demo>, StorageError> {
        delegate!(self, list_demos_for_contact, @str contact_id)
    }
    async fn list_demos_given_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Demo>, StorageError> {
        delegate!(self, list_demos_given_between, @val start, @val end)
    }
}
