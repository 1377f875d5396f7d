use rusqlite::{OptionalExtension as _, params};
use smartcrm_core::{User, UserRecord};

use super::{Storage, get_conn, parse_ts, ts};
use crate::error::StorageError;

impl Storage {
    /// Insert user.
    ///
    /// # Errors
    /// Returns `Duplicate` if the e-mail is already registered.
    pub fn create_user(&self, record: &UserRecord) -> Result<(), StorageError> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.user.id,
                record.user.email,
                record.password_hash,
                ts(&record.user.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let record = conn
            .query_row(
                "SELECT id, email, created_at, password_hash FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok(UserRecord {
                        user: Self::row_to_user(row)?,
                        password_hash: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        let conn = get_conn(&self.pool)?;
        let user = conn
            .query_row(
                "SELECT id, email, created_at FROM users WHERE id = ?1",
                params![id],
                Self::row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User { id: row.get(0)?, email: row.get(1)?, created_at: parse_ts(row, 2)? })
    }
}
