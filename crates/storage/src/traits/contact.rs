use async_trait::async_trait;
use chrono::{DateTime, Utc};
use smartcrm_core::{Contact, ContactCounts, ContactQuery};

use crate::error::StorageError;

/// Contact operations. Phone numbers are unique.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Insert a contact. `Duplicate` when the phone is taken.
    async fn insert_contact(&self, contact: &Contact) -> Result<(), StorageError>;

    async fn get_contact(&self, id: &str) -> Result<Option<Contact>, StorageError>;

    async fn get_contact_by_phone(&self, phone: &str) -> Result<Option<Contact>, StorageError>;

    async fn contact_phone_exists(&self, phone: &str) -> Result<bool, StorageError>;

    /// Contacts for the given ids; missing ids are silently skipped.
    async fn get_contacts_by_ids(&self, ids: &[String]) -> Result<Vec<Contact>, StorageError>;

    /// Filtered page, newest first.
    async fn list_contacts(&self, query: &ContactQuery) -> Result<Vec<Contact>, StorageError>;

    async fn count_contacts(&self) -> Result<ContactCounts, StorageError>;

    /// Persist every mutable field. Returns `false` when the contact is gone.
    async fn update_contact(&self, contact: &Contact) -> Result<bool, StorageError>;

    /// Delete contact. Returns `true` if a row was deleted.
    async fn delete_contact(&self, id: &str) -> Result<bool, StorageError>;

    /// Set `last_call_at`. Returns `false` when the contact is gone.
    async fn record_call(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StorageError>;
}
