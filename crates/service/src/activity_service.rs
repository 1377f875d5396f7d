use std::sync::Arc;

use smartcrm_core::{ActivityLog, MAX_QUERY_LIMIT};
use smartcrm_storage::StorageBackend;
use smartcrm_storage::traits::{ActivityStore, ContactStore};

use crate::ServiceError;

/// Append-only audit trail. Every mutating operation writes exactly one entry
/// through [`ActivityService::record`] after the mutation has succeeded.
pub struct ActivityService {
    storage: Arc<StorageBackend>,
}

impl ActivityService {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>) -> Self {
        Self { storage }
    }

    pub async fn record(&self, entry: ActivityLog) -> Result<(), ServiceError> {
        tracing::debug!(action = %entry.action, target = ?entry.target, user = %entry.user_email, "activity");
        self.storage.append_activity(&entry).await?;
        Ok(())
    }

    pub async fn list(&self, offset: usize, limit: usize) -> Result<Vec<ActivityLog>, ServiceError> {
        Ok(self.storage.list_activity(offset, limit.min(MAX_QUERY_LIMIT)).await?)
    }

    /// Log target for an entry about `contact_id`: the contact's phone when it
    /// still exists, the raw id otherwise.
    pub async fn contact_target(&self, contact_id: &str) -> Result<String, ServiceError> {
        Ok(self
            .storage
            .get_contact(contact_id)
            .await?
            .map_or_else(|| contact_id.to_owned(), |c| c.phone))
    }
}
