use async_trait::async_trait;
use smartcrm_core::{User, UserRecord};

use crate::error::StorageError;

/// Account operations.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. `Duplicate` when the e-mail is taken.
    async fn create_user(&self, record: &UserRecord) -> Result<(), StorageError>;

    /// Look up a user with its password hash by (normalized) e-mail.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError>;
}
