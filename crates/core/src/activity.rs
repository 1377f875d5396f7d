//! Append-only audit trail of user actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::AuthUser;

/// Action labels written to the activity log.
pub mod actions {
    pub const IMPORTED_CONTACTS: &str = "Imported contacts";
    pub const CREATED_CONTACT: &str = "Created contact";
    pub const UPDATED_CONTACT: &str = "Updated contact";
    pub const DELETED_CONTACT: &str = "Deleted contact";
    pub const CALLED_CONTACT: &str = "Called contact";
    pub const ADDED_NOTE: &str = "Added note";
    pub const CREATED_FOLLOW_UP: &str = "Created follow-up";
    pub const COMPLETED_FOLLOW_UP: &str = "Completed follow-up";
    pub const CREATED_MEETING: &str = "Created meeting";
    pub const DELETED_MEETING: &str = "Deleted meeting";
    pub const DEMO_GIVEN: &str = "Demo given";
    pub const DEMO_WATCHED: &str = "Demo watched";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityLog {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub action: String,
    /// Contact phone when a contact is involved, else another identifier
    pub target: Option<String>,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ActivityLog {
    #[must_use]
    pub fn new(user: &AuthUser, action: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: crate::new_id(),
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            action: action.into(),
            target: None,
            details: None,
            timestamp: now,
        }
    }

    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
