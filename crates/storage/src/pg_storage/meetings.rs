use async_trait::async_trait;
use smartcrm_core::{Meeting, MeetingStatus};
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::types::Json;

use super::{PgStorage, parse_pg_json, parse_pg_text};
use crate::error::StorageError;
use crate::traits::MeetingStore;

const MEETING_COLUMNS: &str =
    "id, user_id, user_email, title, date, time, location, notes, attendees, status, created_at";

fn row_to_meeting(row: &PgRow) -> Result<Meeting, StorageError> {
    Ok(Meeting {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        user_email: row.try_get("user_email")?,
        title: row.try_get("title")?,
        date: row.try_get("date")?,
        time: row.try_get("time")?,
        location: row.try_get("location")?,
        notes: row.try_get("notes")?,
        attendees: parse_pg_json(row, "attendees")?,
        status: parse_pg_text(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl MeetingStore for PgStorage {
    async fn insert_meeting(&self, meeting: &Meeting) -> Result<(), StorageError> {
        sqlx::query(&format!(
            "INSERT INTO meetings ({MEETING_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(&meeting.id)
        .bind(&meeting.user_id)
        .bind(&meeting.user_email)
        .bind(&meeting.title)
        .bind(meeting.date)
        .bind(&meeting.time)
        .bind(&meeting.location)
        .bind(&meeting.notes)
        .bind(Json(&meeting.attendees))
        .bind(meeting.status.as_str())
        .bind(meeting.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_meeting(&self, user_id: &str, id: &str) -> Result<Option<Meeting>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_meeting).transpose()
    }

    async fn list_meetings(
        &self,
        user_id: &str,
        status: Option<MeetingStatus>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Meeting>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings
              WHERE user_id = $1 AND ($2::TEXT IS NULL OR status = $2)
              ORDER BY date ASC, time ASC NULLS FIRST, id ASC
              LIMIT $3 OFFSET $4"
        ))
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_meeting).collect()
    }

    async fn update_meeting(&self, meeting: &Meeting) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE meetings SET title = $1, date = $2, time = $3, location = $4, notes = $5,
                    attendees = $6, status = $7
              WHERE id = $8 AND user_id = $9",
        )
        .bind(&meeting.title)
        .bind(meeting.date)
        .bind(&meeting.time)
        .bind(&meeting.location)
        .bind(&meeting.notes)
        .bind(Json(&meeting.attendees))
        .bind(meeting.status.as_str())
        .bind(&meeting.id)
        .bind(&meeting.user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_meeting(&self, user_id: &str, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM meetings WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
