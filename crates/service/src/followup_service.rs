use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use smartcrm_core::{
    ActivityLog, AuthUser, Contact, DateFilter, FollowUp, FollowUpFilter, FollowUpInput,
    FollowUpStatus, FollowUpView, MAX_QUERY_LIMIT, NextFollowUp, UPCOMING_FOLLOWUPS_CAP,
    UpcomingFollowUps, actions, partition_upcoming,
};
use smartcrm_storage::StorageBackend;
use smartcrm_storage::traits::{ContactStore, FollowUpStore};

use crate::{ActivityService, ServiceError};

/// Result of completing a follow-up, with the chained one if scheduled.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedFollowUp {
    pub completed: FollowUp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<FollowUp>,
}

pub struct FollowUpService {
    storage: Arc<StorageBackend>,
    activity: Arc<ActivityService>,
}

impl FollowUpService {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>, activity: Arc<ActivityService>) -> Self {
        Self { storage, activity }
    }

    pub async fn create(&self, input: FollowUpInput, user: &AuthUser) -> Result<FollowUp, ServiceError> {
        let now = Utc::now();
        let followup = FollowUp::new(input, user, now)?;
        self.storage.insert_followup(&followup).await?;

        let target = self.activity.contact_target(&followup.contact_id).await?;
        self.activity
            .record(
                ActivityLog::new(user, actions::CREATED_FOLLOW_UP, now)
                    .target(target)
                    .details(format!("Scheduled for {}", followup.follow_up_date.to_rfc3339())),
            )
            .await?;
        Ok(followup)
    }

    /// Every follow-up, date ascending. `Overdue` is derived from `now`.
    pub async fn list(
        &self,
        filter: Option<FollowUpFilter>,
        now: DateTime<Utc>,
    ) -> Result<Vec<FollowUpView>, ServiceError> {
        let stored_status = match filter {
            None => None,
            Some(FollowUpFilter::Completed) => Some(FollowUpStatus::Completed),
            Some(FollowUpFilter::Pending | FollowUpFilter::Overdue) => Some(FollowUpStatus::Pending),
        };
        let followups = self.storage.list_followups(stored_status).await?;
        Ok(followups
            .into_iter()
            .filter(|f| filter.is_none_or(|flt| flt.matches(f, now)))
            .map(|f| FollowUpView::new(f, None, now))
            .collect())
    }

    /// Dashboard view: every overdue follow-up and the next few upcoming ones.
    pub async fn upcoming(&self, now: DateTime<Utc>) -> Result<UpcomingFollowUps, ServiceError> {
        let pending = self.storage.list_pending_followups(None, 0, None).await?;
        let views = self
            .attach_contacts(pending)
            .await?
            .into_iter()
            .map(|(f, contact)| FollowUpView::new(f, contact, now))
            .collect();
        Ok(partition_upcoming(views, UPCOMING_FOLLOWUPS_CAP))
    }

    /// Pending follow-ups inside the filter's calendar window whose contact still exists.
    pub async fn by_date(
        &self,
        filter: DateFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<FollowUpView>, ServiceError> {
        let pending = self.storage.list_pending_followups(filter.window(now), 0, None).await?;
        self.views_with_contacts(pending, now).await
    }

    pub async fn paginated(
        &self,
        filter: DateFilter,
        offset: usize,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<FollowUpView>, ServiceError> {
        let page = self
            .storage
            .list_pending_followups(filter.window(now), offset, Some(limit.min(MAX_QUERY_LIMIT)))
            .await?;
        self.views_with_contacts(page, now).await
    }

    /// Mark completed and optionally schedule the next follow-up for the same contact.
    pub async fn complete(
        &self,
        id: &str,
        next: NextFollowUp,
        user: &AuthUser,
    ) -> Result<CompletedFollowUp, ServiceError> {
        let mut followup = self
            .storage
            .get_followup(id)
            .await?
            .ok_or(ServiceError::NotFound("Follow-up"))?;
        let now = Utc::now();
        if !self.storage.complete_followup(id, now).await? {
            return Err(ServiceError::NotFound("Follow-up"));
        }
        followup.status = FollowUpStatus::Completed;
        followup.completed_at = Some(now);

        let chained = followup.chained(next, user, now);
        if let Some(next) = &chained {
            self.storage.insert_followup(next).await?;
        }

        let target = self.activity.contact_target(&followup.contact_id).await?;
        let mut entry = ActivityLog::new(user, actions::COMPLETED_FOLLOW_UP, now).target(target);
        if let Some(next) = &chained {
            entry = entry.details(format!(
                "Next follow-up scheduled for {}",
                next.follow_up_date.to_rfc3339()
            ));
        }
        self.activity.record(entry).await?;

        Ok(CompletedFollowUp { completed: followup, next: chained })
    }

    async fn attach_contacts(
        &self,
        followups: Vec<FollowUp>,
    ) -> Result<Vec<(FollowUp, Option<Contact>)>, ServiceError> {
        let mut ids: Vec<String> = followups.iter().map(|f| f.contact_id.clone()).collect();
        ids.sort_unstable();
        ids.dedup();
        let contacts: HashMap<String, Contact> = self
            .storage
            .get_contacts_by_ids(&ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        Ok(followups
            .into_iter()
            .map(|f| {
                let contact = contacts.get(&f.contact_id).cloned();
                (f, contact)
            })
            .collect())
    }

    async fn views_with_contacts(
        &self,
        followups: Vec<FollowUp>,
        now: DateTime<Utc>,
    ) -> Result<Vec<FollowUpView>, ServiceError> {
        Ok(self
            .attach_contacts(followups)
            .await?
            .into_iter()
            .filter_map(|(f, contact)| contact.map(|c| FollowUpView::new(f, Some(c), now)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use smartcrm_core::FollowUpState;
    use smartcrm_storage::traits::ActivityStore;

    use super::*;
    use crate::test_support::{create_test_backend, insert_contact, test_user};

    fn service(storage: &Arc<StorageBackend>) -> FollowUpService {
        FollowUpService::new(Arc::clone(storage), Arc::new(ActivityService::new(Arc::clone(storage))))
    }

    fn input(contact_id: &str, due: DateTime<Utc>) -> FollowUpInput {
        FollowUpInput { contact_id: contact_id.to_owned(), follow_up_date: due, notes: None }
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn past_due_is_overdue_until_completed() {
        let (storage, _dir) = create_test_backend();
        let followups = service(&storage);
        let user = test_user();
        let contact = insert_contact(&storage, "9000000001", "Shop").await;
        let now = Utc::now();

        let late = followups.create(input(&contact.id, now - Duration::hours(2)), &user).await.unwrap();
        followups.create(input(&contact.id, now + Duration::hours(2)), &user).await.unwrap();

        let board = followups.upcoming(now).await.unwrap();
        assert_eq!(board.overdue.len(), 1);
        assert_eq!(board.overdue[0].followup.id, late.id);
        assert_eq!(board.overdue[0].state, FollowUpState::Overdue);
        assert_eq!(board.upcoming.len(), 1);
        assert!(board.upcoming[0].contact.is_some());

        let overdue = followups.list(Some(FollowUpFilter::Overdue), now).await.unwrap();
        assert_eq!(overdue.len(), 1);

        followups.complete(&late.id, NextFollowUp::default(), &user).await.unwrap();
        let board = followups.upcoming(now).await.unwrap();
        assert!(board.overdue.is_empty());
        assert!(followups.list(Some(FollowUpFilter::Overdue), now).await.unwrap().is_empty());
        let completed = followups.list(Some(FollowUpFilter::Completed), now).await.unwrap();
        assert_eq!(completed[0].state, FollowUpState::Completed);
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn completing_can_chain_the_next_followup() {
        let (storage, _dir) = create_test_backend();
        let followups = service(&storage);
        let user = test_user();
        let contact = insert_contact(&storage, "9000000001", "Shop").await;
        let first = followups.create(input(&contact.id, Utc::now()), &user).await.unwrap();

        let next_date = Utc::now() + Duration::days(3);
        let done = followups
            .complete(
                &first.id,
                NextFollowUp { next_follow_up_date: Some(next_date), notes: Some("demo".to_owned()) },
                &user,
            )
            .await
            .unwrap();
        let next = done.next.unwrap();
        assert_eq!(next.previous_id.as_deref(), Some(first.id.as_str()));
        assert_eq!(next.contact_id, contact.id);
        assert!(storage.get_followup(&next.id).await.unwrap().is_some());

        let log = storage.list_activity(0, 10).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].action, "Completed follow-up");
        assert_eq!(log[0].target.as_deref(), Some("9000000001"));

        assert!(followups.complete("missing", NextFollowUp::default(), &user).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn date_views_drop_followups_without_contact() {
        let (storage, _dir) = create_test_backend();
        let followups = service(&storage);
        let user = test_user();
        let contact = insert_contact(&storage, "9000000001", "Shop").await;
        let now = Utc::now();

        followups.create(input(&contact.id, now + Duration::days(2)), &user).await.unwrap();
        followups.create(input("gone", now + Duration::days(3)), &user).await.unwrap();
        followups.create(input(&contact.id, now + Duration::days(30)), &user).await.unwrap();

        assert_eq!(followups.by_date(DateFilter::ThisWeek, now).await.unwrap().len(), 1);
        assert_eq!(followups.by_date(DateFilter::All, now).await.unwrap().len(), 2);
        assert_eq!(followups.paginated(DateFilter::All, 1, 10, now).await.unwrap().len(), 1);
        assert_eq!(followups.upcoming(now).await.unwrap().upcoming.len(), 3);
    }
}
