use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use smartcrm_core::{Contact, ContactCounts, ContactQuery};
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::types::Json;

use super::{PgStorage, escape_like_pattern, parse_pg_json, parse_pg_text};
use crate::error::StorageError;
use crate::traits::ContactStore;

const CONTACT_COLUMNS: &str =
    "id, phone, customer_name, status, data, created_at, updated_at, last_call_at";

fn row_to_contact(row: &PgRow) -> Result<Contact, StorageError> {
    Ok(Contact {
        id: row.try_get("id")?,
        phone: row.try_get("phone")?,
        customer_name: row.try_get("customer_name")?,
        status: parse_pg_text(row, "status")?,
        data: parse_pg_json(row, "data")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_call_at: row.try_get("last_call_at")?,
    })
}

#[async_trait]
impl ContactStore for PgStorage {
    async fn insert_contact(&self, contact: &Contact) -> Result<(), StorageError> {
        sqlx::query(&format!(
            "INSERT INTO contacts ({CONTACT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(&contact.id)
        .bind(&contact.phone)
        .bind(&contact.customer_name)
        .bind(contact.status.as_str())
        .bind(Json(&contact.data))
        .bind(contact.created_at)
        .bind(contact.updated_at)
        .bind(contact.last_call_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_contact(&self, id: &str) -> Result<Option<Contact>, StorageError> {
        let row = sqlx::query(&format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_contact).transpose()
    }

    async fn get_contact_by_phone(&self, phone: &str) -> Result<Option<Contact>, StorageError> {
        let row = sqlx::query(&format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE phone = $1"))
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_contact).transpose()
    }

    async fn contact_phone_exists(&self, phone: &str) -> Result<bool, StorageError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM contacts WHERE phone = $1)")
                .bind(phone)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn get_contacts_by_ids(&self, ids: &[String]) -> Result<Vec<Contact>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows =
            sqlx::query(&format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ANY($1)"))
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        rows.iter().map(row_to_contact).collect()
    }

    async fn list_contacts(&self, query: &ContactQuery) -> Result<Vec<Contact>, StorageError> {
        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like_pattern(s)));
        let rows = sqlx::query(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
              WHERE ($1::TEXT IS NULL
                     OR phone ILIKE $1
                     OR customer_name ILIKE $1
                     OR EXISTS (SELECT 1 FROM jsonb_each_text(data) kv WHERE kv.value ILIKE $1))
                AND ($2::TEXT IS NULL OR status = $2)
              ORDER BY created_at DESC, id DESC
              LIMIT $3 OFFSET $4"
        ))
        .bind(pattern)
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.limit as i64)
        .bind(query.offset as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_contact).collect()
    }

    async fn count_contacts(&self) -> Result<ContactCounts, StorageError> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM contacts GROUP BY status")
            .fetch_all(&self.pool)
            .await?;
        let mut by_status = BTreeMap::new();
        let mut total = 0u64;
        for row in rows {
            let status: String = row.try_get("status")?;
            let count = row.try_get::<i64, _>("n")? as u64;
            total += count;
            by_status.insert(status, count);
        }
        Ok(ContactCounts { total, by_status })
    }

    async fn update_contact(&self, contact: &Contact) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE contacts SET phone = $1, customer_name = $2, status = $3, data = $4,
                    updated_at = $5, last_call_at = $6
              WHERE id = $7",
        )
        .bind(&contact.phone)
        .bind(&contact.customer_name)
        .bind(contact.status.as_str())
        .bind(Json(&contact.data))
        .bind(contact.updated_at)
        .bind(contact.last_call_at)
        .bind(&contact.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_contact(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_call(&self, id: &str, at: DateTime<Utc>) -> Result<bool, StorageError> {
        let result =
            sqlx::query("UPDATE contacts SET last_call_at = $1, updated_at = $1 WHERE id = $2")
                .bind(at)
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
