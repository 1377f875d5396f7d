//! Test utilities and module declarations for storage tests.

use chrono::{DateTime, Duration, SubsecRound as _, Utc};
use serde_json::json;
use smartcrm_core::{
    AuthUser, Contact, ContactInput, FollowUp, FollowUpInput, User, UserRecord,
};
use tempfile::TempDir;

use crate::Storage;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::new(&db_path).unwrap();
    (storage, temp_dir)
}

/// Current time at the microsecond precision the database keeps.
pub fn test_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn test_user() -> AuthUser {
    AuthUser { id: "user-1".to_owned(), email: "agent@example.com".to_owned() }
}

pub fn create_test_user_record(email: &str) -> UserRecord {
    UserRecord {
        user: User { id: smartcrm_core::new_id(), email: email.to_owned(), created_at: test_now() },
        password_hash: "$argon2id$test".to_owned(),
    }
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_contact(phone: &str, shop: &str, now: DateTime<Utc>) -> Contact {
    let data = json!({ "shop_name": shop, "city": "Pune" });
    Contact::from_input(
        ContactInput {
            phone: phone.to_owned(),
            customer_name: Some(format!("Owner of {shop}")),
            status: None,
            data: data.as_object().cloned().unwrap(),
        },
        now,
    )
    .unwrap()
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_followup(contact_id: &str, due: DateTime<Utc>) -> FollowUp {
    FollowUp::new(
        FollowUpInput {
            contact_id: contact_id.to_owned(),
            follow_up_date: due,
            notes: Some("call back".to_owned()),
        },
        &test_user(),
        due - Duration::days(1),
    )
    .unwrap()
}

mod contact_tests;
mod followup_tests;
mod meeting_tests;
