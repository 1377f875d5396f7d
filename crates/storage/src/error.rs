//! Typed error enum for the storage layer.
//!
//! Callers match on specific failure modes (duplicate, corrupt row,
//! pool exhaustion) instead of downcasting opaque boxes.

use thiserror::Error;

/// Storage-layer error with variants covering every expected failure mode.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Unique constraint violation (phone, e-mail, active demo).
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// SQLite statement failure.
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    /// Connection pool exhausted or broken.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// PostgreSQL / connection / timeout failure.
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// Row data could not be deserialized into domain type.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Migration failure.
    #[error("migration error: {0}")]
    Migration(String),

    /// Blocking task panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Blocking(String),
}

impl StorageError {
    /// Whether this error is a unique-constraint violation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }

    pub(crate) fn corrupt(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DataCorruption { context: context.into(), source: Box::new(source) }
    }
}

/// Custom `From<rusqlite::Error>`, not blanket `#[from]`.
///
/// - UNIQUE / PRIMARY KEY violations → `Duplicate`
/// - column conversion failures → `DataCorruption`
/// - everything else → `Sqlite`
#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation
                    && matches!(
                        e.extended_code,
                        rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                            | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    ) =>
            {
                Self::Duplicate(msg.unwrap_or_else(|| e.to_string()))
            },
            rusqlite::Error::FromSqlConversionFailure(idx, ty, source) => Self::DataCorruption {
                context: format!("column {idx} ({ty})"),
                source,
            },
            other => Self::Sqlite(other),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for StorageError {
    fn from(err: r2d2::Error) -> Self {
        Self::Pool(err.to_string())
    }
}

/// Custom `From<sqlx::Error>`, not blanket `#[from]`.
///
/// - SQLSTATE 23505 → `Duplicate`
/// - everything else → `Database`
#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().is_some_and(|c| c == "23505") => {
                Self::Duplicate(db_err.message().to_owned())
            },
            _ => Self::Database(err),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::corrupt("JSON serialization/deserialization", err)
    }
}
