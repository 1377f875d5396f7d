use async_trait::async_trait;
use chrono::{DateTime, Utc};
use smartcrm_core::Demo;
use sqlx::Row;
use sqlx::postgres::PgRow;

use super::PgStorage;
use crate::error::StorageError;
use crate::traits::DemoStore;

const DEMO_COLUMNS: &str =
    "id, contact_id, user_id, user_email, given_at, watched, watched_at, notes, created_at, updated_at";

fn row_to_demo(row: &PgRow) -> Result<Demo, StorageError> {
    Ok(Demo {
        id: row.try_get("id")?,
        contact_id: row.try_get("contact_id")?,
        user_id: row.try_get("user_id")?,
        user_email: row.try_get("user_email")?,
        given_at: row.try_get("given_at")?,
        watched: row.try_get("watched")?,
        watched_at: row.try_get("watched_at")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl DemoStore for PgStorage {
    async fn insert_demo(&self, demo: &Demo) -> Result<(), StorageError> {
        sqlx::query(&format!(
            "INSERT INTO demos ({DEMO_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
        ))
        .bind(&demo.id)
        .bind(&demo.contact_id)
        .bind(&demo.user_id)
        .bind(&demo.user_email)
        .bind(demo.given_at)
        .bind(demo.watched)
        .bind(demo.watched_at)
        .bind(&demo.notes)
        .bind(demo.created_at)
        .bind(demo.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_demo(&self, id: &str) -> Result<Option<Demo>, StorageError> {
        let row = sqlx::query(&format!("SELECT {DEMO_COLUMNS} FROM demos WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_demo).transpose()
    }

    async fn find_active_demo(&self, contact_id: &str) -> Result<Option<Demo>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {DEMO_COLUMNS} FROM demos WHERE contact_id = $1 AND NOT watched LIMIT 1"
        ))
        .bind(contact_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_demo).transpose()
    }

    async fn mark_demo_watched(
        &self,
        id: &str,
        watched_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE demos SET watched = TRUE, watched_at = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(watched_at)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_demos_for_contact(&self, contact_id: &str) -> Result<Vec<Demo>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {DEMO_COLUMNS} FROM demos WHERE contact_id = $1 ORDER BY given_at DESC, id DESC"
        ))
        .bind(contact_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_demo).collect()
    }

    async fn list_demos_given_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Demo>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {DEMO_COLUMNS} FROM demos
              WHERE given_at >= $1 AND given_at <= $2
              ORDER BY given_at ASC, id ASC"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_demo).collect()
    }
}
