use std::sync::Arc;

use chrono::{DateTime, Utc};
use smartcrm_core::{
    ActivityLog, AuthUser, Contact, ContactCounts, ContactInput, ContactPatch, ContactQuery,
    MAX_QUERY_LIMIT, actions,
};
use smartcrm_storage::{StorageBackend, StorageError};
use smartcrm_storage::traits::ContactStore;

use crate::{ActivityService, ServiceError};

const DUPLICATE_PHONE: &str = "Contact with this phone number already exists";

fn duplicate_phone(err: StorageError) -> ServiceError {
    if err.is_duplicate() {
        ServiceError::Conflict(DUPLICATE_PHONE.to_owned())
    } else {
        err.into()
    }
}

pub struct ContactService {
    storage: Arc<StorageBackend>,
    activity: Arc<ActivityService>,
}

impl ContactService {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>, activity: Arc<ActivityService>) -> Self {
        Self { storage, activity }
    }

    pub async fn create(&self, input: ContactInput, user: &AuthUser) -> Result<Contact, ServiceError> {
        let now = Utc::now();
        let contact = Contact::from_input(input, now)?;
        if self.storage.contact_phone_exists(&contact.phone).await? {
            return Err(ServiceError::Conflict(DUPLICATE_PHONE.to_owned()));
        }
        self.storage.insert_contact(&contact).await.map_err(duplicate_phone)?;

        self.activity
            .record(
                ActivityLog::new(user, actions::CREATED_CONTACT, now)
                    .target(&contact.phone)
                    .details(format!(
                        "Customer: {}, Shop: {}, Phone: {}",
                        contact.customer_label(),
                        contact.shop_label(),
                        contact.phone
                    )),
            )
            .await?;
        Ok(contact)
    }

    pub async fn get(&self, id: &str) -> Result<Contact, ServiceError> {
        self.storage.get_contact(id).await?.ok_or(ServiceError::NotFound("Contact"))
    }

    pub async fn list(&self, mut query: ContactQuery) -> Result<Vec<Contact>, ServiceError> {
        query.limit = query.limit.min(MAX_QUERY_LIMIT);
        Ok(self.storage.list_contacts(&query).await?)
    }

    pub async fn count(&self) -> Result<ContactCounts, ServiceError> {
        Ok(self.storage.count_contacts().await?)
    }

    /// Partial update. Only the fields present in `patch` change.
    pub async fn update(
        &self,
        id: &str,
        patch: ContactPatch,
        user: &AuthUser,
    ) -> Result<Contact, ServiceError> {
        let mut contact = self.get(id).await?;
        let original_phone = contact.phone.clone();
        let now = Utc::now();
        let mut changed = contact.apply(patch, now)?;

        if contact.phone != original_phone
            && self.storage.contact_phone_exists(&contact.phone).await?
        {
            return Err(ServiceError::Conflict(DUPLICATE_PHONE.to_owned()));
        }
        if !self.storage.update_contact(&contact).await.map_err(duplicate_phone)? {
            return Err(ServiceError::NotFound("Contact"));
        }

        changed.push("updated_at");
        self.activity
            .record(
                ActivityLog::new(user, actions::UPDATED_CONTACT, now)
                    .target(original_phone)
                    .details(format!(
                        "Customer: {}, Shop: {}, Fields: {}",
                        contact.customer_label(),
                        contact.shop_label(),
                        changed.join(", ")
                    )),
            )
            .await?;
        Ok(contact)
    }

    pub async fn delete(&self, id: &str, user: &AuthUser) -> Result<(), ServiceError> {
        let contact = self.get(id).await?;
        if !self.storage.delete_contact(id).await? {
            return Err(ServiceError::NotFound("Contact"));
        }
        self.activity
            .record(
                ActivityLog::new(user, actions::DELETED_CONTACT, Utc::now())
                    .target(&contact.phone)
                    .details(format!(
                        "Customer: {}, Shop: {}, Phone: {}",
                        contact.customer_label(),
                        contact.shop_label(),
                        contact.phone
                    )),
            )
            .await?;
        Ok(())
    }

    /// Stamp `last_call_at` and return the call time.
    pub async fn record_call(&self, id: &str, user: &AuthUser) -> Result<DateTime<Utc>, ServiceError> {
        let contact = self.get(id).await?;
        let call_time = Utc::now();
        if !self.storage.record_call(id, call_time).await? {
            return Err(ServiceError::NotFound("Contact"));
        }
        self.activity
            .record(
                ActivityLog::new(user, actions::CALLED_CONTACT, call_time)
                    .target(&contact.phone)
                    .details(format!("Call made at {}", call_time.to_rfc3339())),
            )
            .await?;
        Ok(call_time)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use smartcrm_core::ContactStatus;
    use smartcrm_storage::traits::ActivityStore;

    use super::*;
    use crate::test_support::{create_test_backend, test_user};

    fn input(phone: &str) -> ContactInput {
        ContactInput {
            phone: phone.to_owned(),
            customer_name: Some("Ravi".to_owned()),
            status: None,
            data: json!({ "shop_name": "Ravi Kirana" }).as_object().cloned().unwrap_or_default(),
        }
    }

    fn service(storage: &Arc<StorageBackend>) -> ContactService {
        ContactService::new(Arc::clone(storage), Arc::new(ActivityService::new(Arc::clone(storage))))
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn duplicate_phone_is_a_conflict() {
        let (storage, _dir) = create_test_backend();
        let contacts = service(&storage);
        contacts.create(input("9876543210"), &test_user()).await.unwrap();

        let err = contacts.create(input(" 9876543210 "), &test_user()).await.unwrap_err();
        assert!(err.is_duplicate(), "{err:?}");
        assert_eq!(storage.list_activity(0, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn each_mutation_logs_one_entry_targeting_the_phone() {
        let (storage, _dir) = create_test_backend();
        let contacts = service(&storage);
        let user = test_user();

        let contact = contacts.create(input("9000000001"), &user).await.unwrap();
        let patch = ContactPatch { status: Some(ContactStatus::Interested), ..ContactPatch::default() };
        let updated = contacts.update(&contact.id, patch, &user).await.unwrap();
        assert_eq!(updated.status, ContactStatus::Interested);
        contacts.record_call(&contact.id, &user).await.unwrap();
        contacts.delete(&contact.id, &user).await.unwrap();

        let log = storage.list_activity(0, 10).await.unwrap();
        let actions: Vec<_> = log.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["Deleted contact", "Called contact", "Updated contact", "Created contact"]);
        assert!(log.iter().all(|e| e.target.as_deref() == Some("9000000001")));
        assert_eq!(
            log[2].details.as_deref(),
            Some("Customer: Ravi, Shop: Ravi Kirana, Fields: status, updated_at")
        );
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn changing_phone_to_a_taken_one_conflicts() {
        let (storage, _dir) = create_test_backend();
        let contacts = service(&storage);
        let user = test_user();
        contacts.create(input("9000000001"), &user).await.unwrap();
        let second = contacts.create(input("9000000002"), &user).await.unwrap();

        let patch = ContactPatch { phone: Some("9000000001".to_owned()), ..ContactPatch::default() };
        let err = contacts.update(&second.id, patch, &user).await.unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn missing_contact_is_not_found() {
        let (storage, _dir) = create_test_backend();
        let contacts = service(&storage);
        let err = contacts.record_call("missing", &test_user()).await.unwrap_err();
        assert!(err.is_not_found());
        let err = contacts.delete("missing", &test_user()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
