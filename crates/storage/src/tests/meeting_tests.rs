use smartcrm_core::{AuthUser, Meeting, MeetingInput, MeetingStatus};

use super::{create_test_storage, test_now, test_user};

#[expect(clippy::unwrap_used, reason = "test code")]
fn meeting(user: &AuthUser, title: &str, date: &str, time: Option<&str>) -> Meeting {
    Meeting::new(
        MeetingInput {
            title: title.to_owned(),
            date: date.to_owned(),
            time: time.map(str::to_owned),
            location: Some("Office".to_owned()),
            notes: None,
            attendees: Vec::new(),
        },
        user,
        test_now(),
    )
    .unwrap()
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn meetings_are_private_to_their_owner() {
    let (storage, _temp_dir) = create_test_storage();
    let owner = test_user();
    let other = AuthUser { id: "user-2".to_owned(), email: "other@example.com".to_owned() };
    let m = meeting(&owner, "Kickoff", "2026-10-20", Some("10:00"));
    storage.insert_meeting(&m).unwrap();

    assert!(storage.get_meeting(&owner.id, &m.id).unwrap().is_some());
    assert!(storage.get_meeting(&other.id, &m.id).unwrap().is_none());
    assert!(storage.list_meetings(&other.id, None, 0, 10).unwrap().is_empty());
    assert!(!storage.delete_meeting(&other.id, &m.id).unwrap());
    assert!(storage.delete_meeting(&owner.id, &m.id).unwrap());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn list_orders_by_date_and_filters_status() {
    let (storage, _temp_dir) = create_test_storage();
    let user = test_user();
    let later = meeting(&user, "Later", "2026-11-02", None);
    let mut sooner = meeting(&user, "Sooner", "2026-10-21", Some("09:30"));
    storage.insert_meeting(&later).unwrap();
    storage.insert_meeting(&sooner).unwrap();

    let all = storage.list_meetings(&user.id, None, 0, 10).unwrap();
    assert_eq!(all[0].title, "Sooner");
    assert_eq!(all[0].time.as_deref(), Some("09:30"));

    sooner.status = MeetingStatus::Completed;
    assert!(storage.update_meeting(&sooner).unwrap());
    let completed = storage.list_meetings(&user.id, Some(MeetingStatus::Completed), 0, 10).unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, sooner.id);
}
