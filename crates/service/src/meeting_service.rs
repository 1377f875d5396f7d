use std::sync::Arc;

use chrono::Utc;
use smartcrm_core::{
    ActivityLog, AuthUser, MAX_QUERY_LIMIT, Meeting, MeetingInput, MeetingPatch, MeetingStatus,
    actions,
};
use smartcrm_storage::StorageBackend;
use smartcrm_storage::traits::{ContactStore, MeetingStore};

use crate::{ActivityService, ServiceError};

/// Meetings are private: every lookup is scoped to the calling user.
pub struct MeetingService {
    storage: Arc<StorageBackend>,
    activity: Arc<ActivityService>,
}

impl MeetingService {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>, activity: Arc<ActivityService>) -> Self {
        Self { storage, activity }
    }

    pub async fn create(&self, input: MeetingInput, user: &AuthUser) -> Result<Meeting, ServiceError> {
        let now = Utc::now();
        let meeting = Meeting::new(input, user, now)?;
        self.storage.insert_meeting(&meeting).await?;

        let target = self.log_target(&meeting).await?;
        self.activity
            .record(
                ActivityLog::new(user, actions::CREATED_MEETING, now)
                    .target(target)
                    .details(meeting.log_details()),
            )
            .await?;
        Ok(meeting)
    }

    pub async fn list(
        &self,
        user: &AuthUser,
        status: Option<MeetingStatus>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Meeting>, ServiceError> {
        Ok(self
            .storage
            .list_meetings(&user.id, status, offset, limit.min(MAX_QUERY_LIMIT))
            .await?)
    }

    pub async fn get(&self, user: &AuthUser, id: &str) -> Result<Meeting, ServiceError> {
        self.storage.get_meeting(&user.id, id).await?.ok_or(ServiceError::NotFound("Meeting"))
    }

    pub async fn update(
        &self,
        user: &AuthUser,
        id: &str,
        patch: MeetingPatch,
    ) -> Result<Meeting, ServiceError> {
        let mut meeting = self.get(user, id).await?;
        let target = self.log_target(&meeting).await?;
        let change = patch.apply(&mut meeting)?;
        self.persist(&meeting).await?;

        self.activity
            .record(
                ActivityLog::new(user, change.action, Utc::now())
                    .target(target)
                    .details(change.details),
            )
            .await?;
        Ok(meeting)
    }

    pub async fn set_status(
        &self,
        user: &AuthUser,
        id: &str,
        status: MeetingStatus,
    ) -> Result<Meeting, ServiceError> {
        let mut meeting = self.get(user, id).await?;
        meeting.status = status;
        self.persist(&meeting).await?;

        let target = self.log_target(&meeting).await?;
        self.activity
            .record(
                ActivityLog::new(user, status.action_label(), Utc::now())
                    .target(target)
                    .details(meeting.log_details()),
            )
            .await?;
        Ok(meeting)
    }

    pub async fn delete(&self, user: &AuthUser, id: &str) -> Result<(), ServiceError> {
        let meeting = self.get(user, id).await?;
        let target = self.log_target(&meeting).await?;
        if !self.storage.delete_meeting(&user.id, id).await? {
            return Err(ServiceError::NotFound("Meeting"));
        }
        self.activity
            .record(
                ActivityLog::new(user, actions::DELETED_MEETING, Utc::now())
                    .target(target)
                    .details(meeting.log_details()),
            )
            .await?;
        Ok(())
    }

    async fn persist(&self, meeting: &Meeting) -> Result<(), ServiceError> {
        if self.storage.update_meeting(meeting).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("Meeting"))
        }
    }

    /// Phone of the first attendee when it belongs to a known contact, else the title.
    async fn log_target(&self, meeting: &Meeting) -> Result<String, ServiceError> {
        if let Some(phone) = meeting.first_attendee_phone() {
            if let Some(contact) = self.storage.get_contact_by_phone(phone).await? {
                return Ok(contact.phone);
            }
        }
        Ok(meeting.title.clone())
    }
}

#[cfg(test)]
mod tests {
    use smartcrm_core::Attendee;
    use smartcrm_storage::traits::ActivityStore;

    use super::*;
    use crate::test_support::{create_test_backend, insert_contact, test_user};

    fn service(storage: &Arc<StorageBackend>) -> MeetingService {
        MeetingService::new(Arc::clone(storage), Arc::new(ActivityService::new(Arc::clone(storage))))
    }

    fn input(attendee_phone: Option<&str>) -> MeetingInput {
        MeetingInput {
            title: "Product walkthrough".to_owned(),
            date: "2026-10-20".to_owned(),
            time: Some("15:00".to_owned()),
            location: None,
            notes: None,
            attendees: attendee_phone
                .map(|p| Attendee { contact_id: None, name: Some("Asha".to_owned()), phone: Some(p.to_owned()) })
                .into_iter()
                .collect(),
        }
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn log_target_prefers_known_attendee_phone() {
        let (storage, _dir) = create_test_backend();
        let meetings = service(&storage);
        let user = test_user();
        insert_contact(&storage, "9000000001", "Shop").await;

        meetings.create(input(Some("9000000001")), &user).await.unwrap();
        meetings.create(input(Some("0000")), &user).await.unwrap();

        let log = storage.list_activity(0, 10).await.unwrap();
        assert_eq!(log[1].target.as_deref(), Some("9000000001"));
        assert_eq!(log[0].target.as_deref(), Some("Product walkthrough"));
        assert_eq!(
            log[1].details.as_deref(),
            Some("Meeting: Product walkthrough, Date: 2026-10-20 15:00, Attendees: Asha (9000000001)")
        );
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn reschedule_and_status_actions() {
        let (storage, _dir) = create_test_backend();
        let meetings = service(&storage);
        let user = test_user();
        let meeting = meetings.create(input(None), &user).await.unwrap();

        let patch = MeetingPatch { time: Some("16:30".to_owned()), ..MeetingPatch::default() };
        let moved = meetings.update(&user, &meeting.id, patch).await.unwrap();
        assert_eq!(moved.time.as_deref(), Some("16:30"));

        let done = meetings.set_status(&user, &meeting.id, MeetingStatus::Cancelled).await.unwrap();
        assert_eq!(done.status, MeetingStatus::Cancelled);

        let log = storage.list_activity(0, 10).await.unwrap();
        let actions: Vec<_> = log.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["Cancelled meeting", "Rescheduled meeting", "Created meeting"]);

        let empty = meetings.update(&user, &meeting.id, MeetingPatch::default()).await.unwrap_err();
        assert!(matches!(empty, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn other_users_cannot_see_or_delete() {
        let (storage, _dir) = create_test_backend();
        let meetings = service(&storage);
        let owner = test_user();
        let stranger = AuthUser { id: "user-2".to_owned(), email: "x@example.com".to_owned() };
        let meeting = meetings.create(input(None), &owner).await.unwrap();

        assert!(meetings.get(&stranger, &meeting.id).await.unwrap_err().is_not_found());
        assert!(meetings.delete(&stranger, &meeting.id).await.unwrap_err().is_not_found());
        meetings.delete(&owner, &meeting.id).await.unwrap();
        assert!(meetings.list(&owner, None, 0, 10).await.unwrap().is_empty());
    }
}
