use async_trait::async_trait;
use chrono::{DateTime, Utc};
use smartcrm_core::{FollowUp, FollowUpStatus};
use sqlx::Row;
use sqlx::postgres::PgRow;

use super::{PgStorage, parse_pg_text, pg_limit};
use crate::error::StorageError;
use crate::traits::FollowUpStore;

const FOLLOWUP_COLUMNS: &str = "id, contact_id, user_id, user_email, follow_up_date, notes, status, \
                                notified, completed_at, previous_id, created_at";

fn row_to_followup(row: &PgRow) -> Result<FollowUp, StorageError> {
    Ok(FollowUp {
        id: row.try_get("id")?,
        contact_id: row.try_get("contact_id")?,
        user_id: row.try_get("user_id")?,
        user_email: row.try_get("user_email")?,
        follow_up_date: row.try_get("follow_up_date")?,
        notes: row.try_get("notes")?,
        status: parse_pg_text(row, "status")?,
        notified: row.try_get("notified")?,
        completed_at: row.try_get("completed_at")?,
        previous_id: row.try_get("previous_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl FollowUpStore for PgStorage {
    async fn insert_followup(&self, followup: &FollowUp) -> Result<(), StorageError> {
        sqlx::query(&format!(
            "INSERT INTO follow_ups ({FOLLOWUP_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(&followup.id)
        .bind(&followup.contact_id)
        .bind(&followup.user_id)
        .bind(&followup.user_email)
        .bind(followup.follow_up_date)
        .bind(&followup.notes)
        .bind(followup.status.as_str())
        .bind(followup.notified)
        .bind(followup.completed_at)
        .bind(&followup.previous_id)
        .bind(followup.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_followup(&self, id: &str) -> Result<Option<FollowUp>, StorageError> {
        let row = sqlx::query(&format!("SELECT {FOLLOWUP_COLUMNS} FROM follow_ups WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_followup).transpose()
    }

    async fn list_followups(
        &self,
        status: Option<FollowUpStatus>,
    ) -> Result<Vec<FollowUp>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {FOLLOWUP_COLUMNS} FROM follow_ups
              WHERE $1::TEXT IS NULL OR status = $1
              ORDER BY follow_up_date ASC, id ASC"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_followup).collect()
    }

    async fn list_pending_followups(
        &self,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<FollowUp>, StorageError> {
        let (start, end) = window.unzip();
        let rows = sqlx::query(&format!(
            "SELECT {FOLLOWUP_COLUMNS} FROM follow_ups
              WHERE status = $1
                AND ($2::TIMESTAMPTZ IS NULL OR follow_up_date >= $2)
                AND ($3::TIMESTAMPTZ IS NULL OR follow_up_date <= $3)
              ORDER BY follow_up_date ASC, id ASC
              LIMIT $4 OFFSET $5"
        ))
        .bind(FollowUpStatus::Pending.as_str())
        .bind(start)
        .bind(end)
        .bind(pg_limit(limit))
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_followup).collect()
    }

    async fn list_unnotified_due(
        &self,
        due_before: DateTime<Utc>,
    ) -> Result<Vec<FollowUp>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {FOLLOWUP_COLUMNS} FROM follow_ups
              WHERE status = $1 AND NOT notified AND follow_up_date <= $2
              ORDER BY follow_up_date ASC, id ASC"
        ))
        .bind(FollowUpStatus::Pending.as_str())
        .bind(due_before)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_followup).collect()
    }

    async fn complete_followup(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        let result =
            sqlx::query("UPDATE follow_ups SET status = $1, completed_at = $2 WHERE id = $3")
                .bind(FollowUpStatus::Completed.as_str())
                .bind(at)
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_followup_notified(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("UPDATE follow_ups SET notified = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
