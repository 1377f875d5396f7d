//! PostgreSQL storage backend using sqlx.
//!
//! Split into modular files by domain concern.

// Arithmetic in DB operations (pagination, counting) is bounded by DB limits
#![allow(
    clippy::as_conversions,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    reason = "DB row counts and pagination are bounded by PostgreSQL limits"
)]
// Absolute paths in error handling are acceptable
#![allow(clippy::absolute_paths, reason = "std paths in error handling are clear")]

mod activity;
mod contacts;
mod demos;
mod followups;
mod meetings;
mod notes;
mod users;

use std::str::FromStr;

use smartcrm_core::{PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS, PG_POOL_MAX_CONNECTIONS};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use super::pg_migrations::run_pg_migrations;
use crate::error::StorageError;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(std::time::Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(std::time::Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        run_pg_migrations(&pool).await.map_err(|e| StorageError::Migration(e.to_string()))?;
        tracing::info!("PgStorage initialized");
        Ok(Self { pool })
    }
}

/// Parse a text column through `FromStr`, reporting bad values as corruption.
pub(crate) fn parse_pg_text<T>(row: &PgRow, column: &str) -> Result<T, StorageError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e| StorageError::corrupt(format!("column {column} = {raw:?}"), e))
}

/// Decode a JSONB column into a domain type.
pub(crate) fn parse_pg_json<T: serde::de::DeserializeOwned>(
    row: &PgRow,
    column: &str,
) -> Result<T, StorageError> {
    let value: serde_json::Value = row.try_get(column)?;
    serde_json::from_value(value).map_err(|e| StorageError::corrupt(format!("column {column}"), e))
}

/// Escape special characters for ILIKE pattern matching
pub(crate) fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// `LIMIT` value; PostgreSQL treats `LIMIT NULL` as unbounded.
pub(crate) fn pg_limit(limit: Option<usize>) -> Option<i64> {
    limit.map(|l| l as i64)
}
