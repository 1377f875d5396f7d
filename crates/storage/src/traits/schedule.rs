use async_trait::async_trait;
use chrono::{DateTime, Utc};
use smartcrm_core::{Demo, Meeting, MeetingStatus};

use crate::error::StorageError;

/// Meetings. Every read and write is scoped to the owning user.
#[async_trait]
pub trait MeetingStore: Send + Sync {
    async fn insert_meeting(&self, meeting: &Meeting) -> Result<(), StorageError>;

    async fn get_meeting(&self, user_id: &str, id: &str) -> Result<Option<Meeting>, StorageError>;

    /// Page of the user's meetings ordered by date then time.
    async fn list_meetings(
        &self,
        user_id: &str,
        status: Option<MeetingStatus>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Meeting>, StorageError>;

    /// Persist every mutable field of an owned meeting.
    async fn update_meeting(&self, meeting: &Meeting) -> Result<bool, StorageError>;

    async fn delete_meeting(&self, user_id: &str, id: &str) -> Result<bool, StorageError>;
}

/// Product demos.
#[async_trait]
pub trait DemoStore: Send + Sync {
    /// Insert a demo. `Duplicate` when the contact already has an active one.
    async fn insert_demo(&self, demo: &Demo) -> Result<(), StorageError>;

    async fn get_demo(&self, id: &str) -> Result<Option<Demo>, StorageError>;

    /// The not-yet-watched demo of a contact, if any.
    async fn find_active_demo(&self, contact_id: &str) -> Result<Option<Demo>, StorageError>;

    async fn mark_demo_watched(
        &self,
        id: &str,
        watched_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StorageError>;

    /// Demo history of a contact, newest first.
    async fn list_demos_for_contact(&self, contact_id: &str) -> Result<Vec<Demo>, StorageError>;

    /// Demos with `given_at` inside the inclusive range.
    async fn list_demos_given_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Demo>, StorageError>;
}
