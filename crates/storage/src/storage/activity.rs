use rusqlite::params;
use smartcrm_core::ActivityLog;

use super::{Storage, get_conn, parse_ts, ts};
use crate::error::StorageError;

impl Storage {
    pub fn append_activity(&self, entry: &ActivityLog) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO activity_logs (id, user_id, user_email, action, target, details, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.id,
                entry.user_id,
                entry.user_email,
                entry.action,
                entry.target,
                entry.details,
                ts(&entry.timestamp),
            ],
        )?;
        Ok(())
    }

    /// Page of activity entries, newest first.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn list_activity(&self, offset: usize, limit: usize) -> Result<Vec<ActivityLog>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, user_email, action, target, details, timestamp
               FROM activity_logs
              ORDER BY timestamp DESC, rowid DESC
              LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt.query_map(params![limit as i64, offset as i64], |row| {
            Ok(ActivityLog {
                id: row.get(0)?,
                user_id: row.get(1)?,
                user_email: row.get(2)?,
                action: row.get(3)?,
                target: row.get(4)?,
                details: row.get(5)?,
                timestamp: parse_ts(row, 6)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
