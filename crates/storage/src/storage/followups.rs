use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, ToSql, params};
use smartcrm_core::{FollowUp, FollowUpStatus};

use super::{Storage, get_conn, opt_ts, parse_opt_ts, parse_text, parse_ts, sql_limit, ts};
use crate::error::StorageError;

const FOLLOWUP_COLUMNS: &str = "id, contact_id, user_id, user_email, follow_up_date, notes, status, \
                                notified, completed_at, previous_id, created_at";

impl Storage {
    pub fn insert_followup(&self, followup: &FollowUp) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            &format!(
                "INSERT INTO follow_ups ({FOLLOWUP_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                followup.id,
                followup.contact_id,
                followup.user_id,
                followup.user_email,
                ts(&followup.follow_up_date),
                followup.notes,
                followup.status.as_str(),
                followup.notified,
                opt_ts(followup.completed_at.as_ref()),
                followup.previous_id,
                ts(&followup.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_followup(&self, id: &str) -> Result<Option<FollowUp>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let followup = conn
            .query_row(
                &format!("SELECT {FOLLOWUP_COLUMNS} FROM follow_ups WHERE id = ?1"),
                params![id],
                Self::row_to_followup,
            )
            .optional()?;
        Ok(followup)
    }

    pub fn list_followups(&self, status: Option<FollowUpStatus>) -> Result<Vec<FollowUp>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let status = status.map(|s| s.as_str());
        let mut stmt = conn.prepare(&format!(
            "SELECT {FOLLOWUP_COLUMNS} FROM follow_ups
              WHERE ?1 IS NULL OR status = ?1
              ORDER BY follow_up_date ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![status], Self::row_to_followup)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Pending follow-ups inside an inclusive due-date window, paged.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_pending_followups(
        &self,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<FollowUp>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let bounds = window.map(|(start, end)| (ts(&start), ts(&end)));
        let limit = sql_limit(limit);
        let offset = offset as i64;
        let pending = FollowUpStatus::Pending.as_str();

        let mut sql = format!("SELECT {FOLLOWUP_COLUMNS} FROM follow_ups WHERE status = ?");
        let mut args: Vec<&dyn ToSql> = vec![&pending];
        if let Some((start, end)) = &bounds {
            sql.push_str(" AND follow_up_date >= ? AND follow_up_date <= ?");
            args.push(start);
            args.push(end);
        }
        sql.push_str(" ORDER BY follow_up_date ASC, id ASC LIMIT ? OFFSET ?");
        args.push(&limit);
        args.push(&offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(args.as_slice(), Self::row_to_followup)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_unnotified_due(&self, due_before: DateTime<Utc>) -> Result<Vec<FollowUp>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FOLLOWUP_COLUMNS} FROM follow_ups
              WHERE status = ?1 AND notified = 0 AND follow_up_date <= ?2
              ORDER BY follow_up_date ASC, id ASC"
        ))?;
        let rows = stmt.query_map(
            params![FollowUpStatus::Pending.as_str(), ts(&due_before)],
            Self::row_to_followup,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn complete_followup(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let affected = conn.execute(
            "UPDATE follow_ups SET status = ?1, completed_at = ?2 WHERE id = ?3",
            params![FollowUpStatus::Completed.as_str(), ts(&at), id],
        )?;
        Ok(affected > 0)
    }

    pub fn mark_followup_notified(&self, id: &str) -> Result<bool, StorageError> {
        let conn = get_conn(&self.pool)?;
        let affected =
            conn.execute("UPDATE follow_ups SET notified = 1 WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    fn row_to_followup(row: &rusqlite::Row<'_>) -> rusqlite::Result<FollowUp> {
        Ok(FollowUp {
            id: row.get(0)?,
            contact_id: row.get(1)?,
            user_id: row.get(2)?,
            user_email: row.get(3)?,
            follow_up_date: parse_ts(row, 4)?,
            notes: row.get(5)?,
            status: parse_text(row, 6)?,
            notified: row.get(7)?,
            completed_at: parse_opt_ts(row, 8)?,
            previous_id: row.get(9)?,
            created_at: parse_ts(row, 10)?,
        })
    }
}
