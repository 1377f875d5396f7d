use chrono::Duration;
use smartcrm_core::FollowUpStatus;

use super::{create_test_followup, create_test_storage, test_now};

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn insert_get_and_list_by_status() {
    let (storage, _temp_dir) = create_test_storage();
    let now = test_now();
    let early = create_test_followup("c1", now + Duration::hours(1));
    let late = create_test_followup("c2", now + Duration::hours(5));
    storage.insert_followup(&late).unwrap();
    storage.insert_followup(&early).unwrap();

    let loaded = storage.get_followup(&early.id).unwrap().unwrap();
    assert_eq!(loaded.follow_up_date, early.follow_up_date);
    assert_eq!(loaded.status, FollowUpStatus::Pending);

    let all = storage.list_followups(None).unwrap();
    assert_eq!(all.iter().map(|f| f.id.as_str()).collect::<Vec<_>>(), vec![early.id.as_str(), late.id.as_str()]);

    assert!(storage.complete_followup(&early.id, now).unwrap());
    let completed = storage.list_followups(Some(FollowUpStatus::Completed)).unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].completed_at, Some(now));
    assert_eq!(storage.list_followups(Some(FollowUpStatus::Pending)).unwrap().len(), 1);
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn pending_window_is_inclusive_and_paged() {
    let (storage, _temp_dir) = create_test_storage();
    let now = test_now();
    let ids: Vec<String> = (0..4)
        .map(|i| {
            let f = create_test_followup("c1", now + Duration::hours(i));
            storage.insert_followup(&f).unwrap();
            f.id
        })
        .collect();

    let window = Some((now + Duration::hours(1), now + Duration::hours(3)));
    let in_window = storage.list_pending_followups(window, 0, None).unwrap();
    assert_eq!(in_window.len(), 3);
    assert_eq!(in_window[0].id, ids[1]);

    let page = storage.list_pending_followups(None, 1, Some(2)).unwrap();
    assert_eq!(page.iter().map(|f| f.id.clone()).collect::<Vec<_>>(), ids[1..3].to_vec());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn unnotified_due_respects_notified_flag_and_status() {
    let (storage, _temp_dir) = create_test_storage();
    let now = test_now();
    let due = create_test_followup("c1", now + Duration::minutes(10));
    let far = create_test_followup("c2", now + Duration::days(2));
    let done = create_test_followup("c3", now - Duration::minutes(10));
    for f in [&due, &far, &done] {
        storage.insert_followup(f).unwrap();
    }
    storage.complete_followup(&done.id, now).unwrap();

    let alerts = storage.list_unnotified_due(now + Duration::minutes(30)).unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, due.id);

    assert!(storage.mark_followup_notified(&due.id).unwrap());
    assert!(storage.list_unnotified_due(now + Duration::minutes(30)).unwrap().is_empty());
    assert!(!storage.mark_followup_notified("missing").unwrap());
}
