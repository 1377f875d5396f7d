use async_trait::async_trait;
use smartcrm_core::{User, UserRecord};
use sqlx::Row;
use sqlx::postgres::PgRow;

use super::PgStorage;
use crate::error::StorageError;
use crate::traits::UserStore;

fn row_to_user(row: &PgRow) -> Result<User, StorageError> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl UserStore for PgStorage {
    async fn create_user(&self, record: &UserRecord) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&record.user.id)
        .bind(&record.user.email)
        .bind(&record.password_hash)
        .bind(record.user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(
            "SELECT id, email, created_at, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| -> Result<UserRecord, StorageError> {
            Ok(UserRecord { user: row_to_user(&r)?, password_hash: r.try_get("password_hash")? })
        })
        .transpose()
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query("SELECT id, email, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }
}
