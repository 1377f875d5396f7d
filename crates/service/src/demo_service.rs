use std::sync::Arc;

use chrono::{DateTime, Utc};
use smartcrm_core::{
    ActivityLog, AuthUser, Demo, DemoGrouping, DemoInput, DemoPeriodStats, DemoStats, DemoWatch,
    UNKNOWN_SHOP, actions, report, summarize,
};
use smartcrm_storage::{StorageBackend, StorageError};
use smartcrm_storage::traits::{ContactStore, DemoStore};

use crate::{ActivityService, ServiceError};

const ACTIVE_DEMO_EXISTS: &str = "An active demo already exists for this contact";

fn active_demo_conflict(err: StorageError) -> ServiceError {
    if err.is_duplicate() {
        ServiceError::Conflict(ACTIVE_DEMO_EXISTS.to_owned())
    } else {
        err.into()
    }
}

pub struct DemoService {
    storage: Arc<StorageBackend>,
    activity: Arc<ActivityService>,
}

impl DemoService {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>, activity: Arc<ActivityService>) -> Self {
        Self { storage, activity }
    }

    /// Record a demo given to a contact. A contact has at most one unwatched demo.
    pub async fn give(&self, input: DemoInput, user: &AuthUser) -> Result<Demo, ServiceError> {
        let contact = self
            .storage
            .get_contact(&input.contact_id)
            .await?
            .ok_or(ServiceError::NotFound("Contact"))?;
        if self.storage.find_active_demo(&contact.id).await?.is_some() {
            return Err(ServiceError::Conflict(ACTIVE_DEMO_EXISTS.to_owned()));
        }

        let demo = Demo::new(input, user, Utc::now());
        self.storage.insert_demo(&demo).await.map_err(active_demo_conflict)?;

        self.activity
            .record(
                ActivityLog::new(user, actions::DEMO_GIVEN, demo.given_at)
                    .target(&contact.phone)
                    .details(format!(
                        "Shop: {}, Given at: {}",
                        contact.shop_label(),
                        demo.given_at.to_rfc3339()
                    )),
            )
            .await?;
        Ok(demo)
    }

    /// Only the user who gave the demo may mark it watched.
    pub async fn mark_watched(
        &self,
        id: &str,
        watch: DemoWatch,
        user: &AuthUser,
    ) -> Result<Demo, ServiceError> {
        let mut demo = self.storage.get_demo(id).await?.ok_or(ServiceError::NotFound("Demo"))?;
        if demo.user_id != user.id {
            return Err(ServiceError::Forbidden("Not authorized".to_owned()));
        }

        let now = Utc::now();
        let watched_at = watch.watched_at.unwrap_or(now);
        if !self.storage.mark_demo_watched(id, watched_at, now).await? {
            return Err(ServiceError::NotFound("Demo"));
        }
        demo.watched = true;
        demo.watched_at = Some(watched_at);
        demo.updated_at = now;

        let contact = self.storage.get_contact(&demo.contact_id).await?;
        let (target, shop) = contact.map_or_else(
            || (demo.contact_id.clone(), UNKNOWN_SHOP.to_owned()),
            |c| (c.phone.clone(), c.shop_label()),
        );
        self.activity
            .record(
                ActivityLog::new(user, actions::DEMO_WATCHED, now)
                    .target(target)
                    .details(format!("Shop: {shop}, Watched at: {}", watched_at.to_rfc3339())),
            )
            .await?;
        Ok(demo)
    }

    pub async fn history(&self, contact_id: &str) -> Result<Vec<Demo>, ServiceError> {
        Ok(self.storage.list_demos_for_contact(contact_id).await?)
    }

    pub async fn report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        grouping: DemoGrouping,
    ) -> Result<Vec<DemoPeriodStats>, ServiceError> {
        let demos = self.storage.list_demos_given_between(start, end).await?;
        Ok(report(&demos, grouping))
    }

    pub async fn summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DemoStats, ServiceError> {
        let demos = self.storage.list_demos_given_between(start, end).await?;
        Ok(summarize(&demos))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use smartcrm_storage::traits::ActivityStore;

    use super::*;
    use crate::test_support::{create_test_backend, insert_contact, test_user};

    fn service(storage: &Arc<StorageBackend>) -> DemoService {
        DemoService::new(Arc::clone(storage), Arc::new(ActivityService::new(Arc::clone(storage))))
    }

    fn input(contact_id: &str) -> DemoInput {
        DemoInput { contact_id: contact_id.to_owned(), notes: None }
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn second_active_demo_is_rejected() {
        let (storage, _dir) = create_test_backend();
        let demos = service(&storage);
        let user = test_user();
        let contact = insert_contact(&storage, "9000000001", "Ravi Kirana").await;

        let first = demos.give(input(&contact.id), &user).await.unwrap();
        let err = demos.give(input(&contact.id), &user).await.unwrap_err();
        assert!(err.is_duplicate(), "{err:?}");

        demos.mark_watched(&first.id, DemoWatch::default(), &user).await.unwrap();
        demos.give(input(&contact.id), &user).await.unwrap();
        assert_eq!(demos.history(&contact.id).await.unwrap().len(), 2);

        let log = storage.list_activity(0, 10).await.unwrap();
        let actions: Vec<_> = log.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["Demo given", "Demo watched", "Demo given"]);
        assert!(log[2].details.as_deref().unwrap().starts_with("Shop: Ravi Kirana, Given at: "));
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn only_the_giver_can_mark_watched() {
        let (storage, _dir) = create_test_backend();
        let demos = service(&storage);
        let contact = insert_contact(&storage, "9000000001", "Shop").await;
        let demo = demos.give(input(&contact.id), &test_user()).await.unwrap();

        let stranger = AuthUser { id: "user-2".to_owned(), email: "x@example.com".to_owned() };
        let err = demos.mark_watched(&demo.id, DemoWatch::default(), &stranger).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(demos.mark_watched("missing", DemoWatch::default(), &stranger).await.unwrap_err().is_not_found());
        assert!(demos.give(input("missing"), &stranger).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    #[expect(clippy::unwrap_used, reason = "test code")]
    async fn summary_counts_demos_in_range() {
        let (storage, _dir) = create_test_backend();
        let demos = service(&storage);
        let user = test_user();
        for phone in ["9000000001", "9000000002"] {
            let contact = insert_contact(&storage, phone, "Shop").await;
            let demo = demos.give(input(&contact.id), &user).await.unwrap();
            if phone.ends_with('1') {
                demos.mark_watched(&demo.id, DemoWatch::default(), &user).await.unwrap();
            }
        }
        let now = Utc::now();
        let stats = demos.summary(now - Duration::hours(1), now + Duration::hours(1)).await.unwrap();
        assert_eq!((stats.given, stats.watched), (2, 1));
        assert!((stats.conversion - 0.5).abs() < f64::EPSILON);

        let periods = demos
            .report(now - Duration::hours(1), now + Duration::hours(1), DemoGrouping::Month)
            .await
            .unwrap();
        assert_eq!(periods.iter().map(|p| p.given).sum::<u64>(), 2);
    }
}
