use async_trait::async_trait;
use smartcrm_core::ActivityLog;
use sqlx::Row;

use super::PgStorage;
use crate::error::StorageError;
use crate::traits::ActivityStore;

#[async_trait]
impl ActivityStore for PgStorage {
    async fn append_activity(&self, entry: &ActivityLog) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO activity_logs (id, user_id, user_email, action, target, details, timestamp)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.user_email)
        .bind(&entry.action)
        .bind(&entry.target)
        .bind(&entry.details)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_activity(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ActivityLog>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, user_id, user_email, action, target, details, timestamp
               FROM activity_logs
              ORDER BY timestamp DESC, id DESC
              LIMIT $1 OFFSET $2",
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| -> Result<ActivityLog, StorageError> {
                Ok(ActivityLog {
                    id: row.try_get("id")?,
                    user_id: row.try_get("user_id")?,
                    user_email: row.try_get("user_email")?,
                    action: row.try_get("action")?,
                    target: row.try_get("target")?,
                    details: row.try_get("details")?,
                    timestamp: row.try_get("timestamp")?,
                })
            })
            .collect()
    }
}
