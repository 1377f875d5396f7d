use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use smartcrm_core::{AuthUser, Contact, ContactInput};
use smartcrm_storage::StorageBackend;
use smartcrm_storage::traits::ContactStore;
use tempfile::TempDir;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_backend() -> (Arc<StorageBackend>, TempDir) {
    let dir = TempDir::new().unwrap();
    let backend = StorageBackend::new_sqlite(&dir.path().join("crm.db")).unwrap();
    (Arc::new(backend), dir)
}

pub fn test_user() -> AuthUser {
    AuthUser { id: "user-1".to_owned(), email: "agent@example.com".to_owned() }
}

/// Stored contact whose shop label is `shop`.
#[expect(clippy::unwrap_used, reason = "test code")]
pub async fn insert_contact(storage: &StorageBackend, phone: &str, shop: &str) -> Contact {
    let mut data = smartcrm_core::Attributes::new();
    data.insert("shop_name".to_owned(), json!(shop));
    let input = ContactInput {
        phone: phone.to_owned(),
        customer_name: Some(format!("Owner of {shop}")),
        status: None,
        data,
    };
    let contact = Contact::from_input(input, Utc::now()).unwrap();
    storage.insert_contact(&contact).await.unwrap();
    contact
}
