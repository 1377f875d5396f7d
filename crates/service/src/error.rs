//! Typed error enum for the service layer.
//!
//! Unifies storage and domain validation failures into a single error type,
//! so the HTTP layer can map each failure mode to a status code without
//! inspecting message strings.

use smartcrm_core::CrmError;
use smartcrm_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, pool, corrupt row).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Caller provided invalid input (validation, filter, date, mapping, workbook).
    #[error("{0}")]
    InvalidInput(String),

    /// Referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unique key already taken (phone, active demo).
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials or an invalid / expired token.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to touch the entity.
    #[error("{0}")]
    Forbidden(String),

    /// Reminder e-mail could not be built or delivered.
    #[error("notification: {0}")]
    Notification(String),

    /// Password hashing, token signing or a blocking task failed.
    #[error("internal: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this error represents a duplicate/conflict.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Conflict(_)) || matches!(self, Self::Storage(e) if e.is_duplicate())
    }
}

impl From<CrmError> for ServiceError {
    fn from(err: CrmError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("blocking task failed: {err}"))
    }
}
