use async_trait::async_trait;
use chrono::{DateTime, Utc};
use smartcrm_core::{FollowUp, FollowUpStatus};

use crate::error::StorageError;

/// Follow-up scheduling operations. All listings are ordered by due date, ascending.
#[async_trait]
pub trait FollowUpStore: Send + Sync {
    async fn insert_followup(&self, followup: &FollowUp) -> Result<(), StorageError>;

    async fn get_followup(&self, id: &str) -> Result<Option<FollowUp>, StorageError>;

    /// Every follow-up, optionally restricted to one stored status.
    async fn list_followups(
        &self,
        status: Option<FollowUpStatus>,
    ) -> Result<Vec<FollowUp>, StorageError>;

    /// Pending follow-ups due inside the inclusive window (or any time), paged.
    async fn list_pending_followups(
        &self,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<FollowUp>, StorageError>;

    /// Pending, not yet notified follow-ups due at or before `due_before`.
    async fn list_unnotified_due(
        &self,
        due_before: DateTime<Utc>,
    ) -> Result<Vec<FollowUp>, StorageError>;

    /// Mark completed. Returns `false` when the follow-up is gone.
    async fn complete_followup(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StorageError>;

    async fn mark_followup_notified(&self, id: &str) -> Result<bool, StorageError>;
}
