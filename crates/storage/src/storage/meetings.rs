use rusqlite::{OptionalExtension as _, params};
use smartcrm_core::{Meeting, MeetingStatus};

use super::{Storage, get_conn, parse_json, parse_text, parse_ts, ts};
use crate::error::StorageError;

const MEETING_COLUMNS: &str =
    "id, user_id, user_email, title, date, time, location, notes, attendees, status, created_at";

impl Storage {
    pub fn insert_meeting(&self, meeting: &Meeting) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            &format!(
                "INSERT INTO meetings ({MEETING_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                meeting.id,
                meeting.user_id,
                meeting.user_email,
                meeting.title,
                meeting.date.to_string(),
                meeting.time,
                meeting.location,
                meeting.notes,
                serde_json::to_string(&meeting.attendees)?,
                meeting.status.as_str(),
                ts(&meeting.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_meeting(&self, user_id: &str, id: &str) -> Result<Option<Meeting>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let meeting = conn
            .query_row(
                &format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ?1 AND user_id = ?2"),
                params![id, user_id],
                Self::row_to_meeting,
            )
            .optional()?;
        Ok(meeting)
    }

    pub fn list_meetings(
        &self,
        user_id: &str,
        status: Option<MeetingStatus>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Meeting>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MEETING_COLUMNS} FROM meetings
              WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
              ORDER BY date ASC, time ASC, id ASC
              LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt.query_map(
            params![user_id, status.map(|s| s.as_str()), limit as i64, offset as i64],
            Self::row_to_meeting,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn update_meeting(&self, meeting: &Meeting) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE meetings SET title = ?1, date = ?2, time = ?3, location = ?4, notes = ?5,
                    attendees = ?6, status = ?7
              WHERE id = ?8 AND user_id = ?9",
            params![
                meeting.title,
                meeting.date.to_string(),
                meeting.time,
                meeting.location,
                meeting.notes,
                serde_json::to_string(&meeting.attendees)?,
                meeting.status.as_str(),
                meeting.id,
                meeting.user_id,
            ],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_meeting(&self, user_id: &str, id: &str) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "DELETE FROM meetings WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(affected > 0)
    }

    fn row_to_meeting(row: &rusqlite::Row<'_>) -> rusqlite::Result<Meeting> {
        Ok(Meeting {
            id: row.get(0)?,
            user_id: row.get(1)?,
            user_email: row.get(2)?,
            title: row.get(3)?,
            date: parse_text(row, 4)?,
            time: row.get(5)?,
            location: row.get(6)?,
            notes: row.get(7)?,
            attendees: parse_json(row, 8)?,
            status: parse_text(row, 9)?,
            created_at: parse_ts(row, 10)?,
        })
    }
}
