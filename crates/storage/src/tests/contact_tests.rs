use chrono::Duration;
use smartcrm_core::{ContactPatch, ContactQuery, ContactStatus};

use super::{create_test_contact, create_test_storage, test_now};

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn insert_and_get_contact_roundtrips_attributes() {
    let (storage, _temp_dir) = create_test_storage();
    let contact = create_test_contact("9000000001", "Sharma Stores", test_now());
    storage.insert_contact(&contact).unwrap();

    let loaded = storage.get_contact(&contact.id).unwrap().unwrap();
    assert_eq!(loaded.phone, "9000000001");
    assert_eq!(loaded.shop_name().as_deref(), Some("Sharma Stores"));
    assert_eq!(loaded.status, ContactStatus::None);
    assert_eq!(loaded.created_at, contact.created_at);

    let by_phone = storage.get_contact_by_phone("9000000001").unwrap().unwrap();
    assert_eq!(by_phone.id, contact.id);
    assert!(storage.contact_phone_exists("9000000001").unwrap());
    assert!(!storage.contact_phone_exists("9000000002").unwrap());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn duplicate_phone_maps_to_duplicate_error() {
    let (storage, _temp_dir) = create_test_storage();
    let now = test_now();
    storage.insert_contact(&create_test_contact("9000000001", "A", now)).unwrap();
    let err = storage.insert_contact(&create_test_contact("9000000001", "B", now)).unwrap_err();
    assert!(err.is_duplicate());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn list_contacts_newest_first_with_paging() {
    let (storage, _temp_dir) = create_test_storage();
    let base = test_now();
    for i in 0..5 {
        let contact =
            create_test_contact(&format!("90000000{i:02}"), &format!("Shop {i}"), base + Duration::seconds(i));
        storage.insert_contact(&contact).unwrap();
    }

    let page = storage
        .list_contacts(&ContactQuery { offset: 1, limit: 2, ..ContactQuery::default() })
        .unwrap();
    let phones: Vec<_> = page.iter().map(|c| c.phone.as_str()).collect();
    assert_eq!(phones, vec!["9000000003", "9000000002"]);
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn search_matches_phone_name_and_attribute_values() {
    let (storage, _temp_dir) = create_test_storage();
    let now = test_now();
    storage.insert_contact(&create_test_contact("9111111111", "Gupta Traders", now)).unwrap();
    storage.insert_contact(&create_test_contact("9222222222", "Mehta Mart", now)).unwrap();

    let query = |s: &str| ContactQuery { search: Some(s.to_owned()), limit: 10, ..ContactQuery::default() };

    assert_eq!(storage.list_contacts(&query("91111")).unwrap().len(), 1);
    assert_eq!(storage.list_contacts(&query("owner of mehta")).unwrap().len(), 1);
    assert_eq!(storage.list_contacts(&query("traders")).unwrap().len(), 1);
    assert_eq!(storage.list_contacts(&query("pune")).unwrap().len(), 2);
    assert!(storage.list_contacts(&query("100%")).unwrap().is_empty());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn status_filter_and_counts() {
    let (storage, _temp_dir) = create_test_storage();
    let now = test_now();
    let mut hot = create_test_contact("9000000001", "Hot", now);
    hot.status = ContactStatus::Interested;
    storage.insert_contact(&hot).unwrap();
    storage.insert_contact(&create_test_contact("9000000002", "Cold", now)).unwrap();

    let interested = storage
        .list_contacts(&ContactQuery {
            status: Some(ContactStatus::Interested),
            limit: 10,
            ..ContactQuery::default()
        })
        .unwrap();
    assert_eq!(interested.len(), 1);
    assert_eq!(interested[0].id, hot.id);

    let counts = storage.count_contacts().unwrap();
    assert_eq!(counts.total, 2);
    assert_eq!(counts.by_status.get("Interested"), Some(&1));
    assert_eq!(counts.by_status.get("None"), Some(&1));
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn update_delete_and_record_call() {
    let (storage, _temp_dir) = create_test_storage();
    let now = test_now();
    let mut contact = create_test_contact("9000000001", "Shop", now);
    storage.insert_contact(&contact).unwrap();

    let later = now + Duration::minutes(5);
    let changed = contact
        .apply(
            ContactPatch { status: Some(ContactStatus::Converted), ..ContactPatch::default() },
            later,
        )
        .unwrap();
    assert_eq!(changed, vec!["status"]);
    assert!(storage.update_contact(&contact).unwrap());
    assert_eq!(storage.get_contact(&contact.id).unwrap().unwrap().status, ContactStatus::Converted);

    let call_at = later + Duration::minutes(1);
    assert!(storage.record_call(&contact.id, call_at).unwrap());
    assert_eq!(storage.get_contact(&contact.id).unwrap().unwrap().last_call_at, Some(call_at));

    assert!(storage.delete_contact(&contact.id).unwrap());
    assert!(!storage.delete_contact(&contact.id).unwrap());
    assert!(!storage.record_call(&contact.id, call_at).unwrap());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn get_contacts_by_ids_skips_unknown() {
    let (storage, _temp_dir) = create_test_storage();
    let contact = create_test_contact("9000000001", "Shop", test_now());
    storage.insert_contact(&contact).unwrap();

    let found = storage.get_contacts_by_ids(&[contact.id.clone(), "nope".to_owned()]).unwrap();
    assert_eq!(found.len(), 1);
    assert!(storage.get_contacts_by_ids(&[]).unwrap().is_empty());
}

#[test]
#[expect(clippy::unwrap_used, reason = "test code")]
fn get_contacts_by_ids_handles_more_ids_than_bind_variables() {
    let (storage, _temp_dir) = create_test_storage();
    let contact = create_test_contact("9000000001", "Shop", test_now());
    storage.insert_contact(&contact).unwrap();

    let mut ids: Vec<String> = (0..40_000).map(|i| format!("id-{i}")).collect();
    ids.push(contact.id.clone());
    let found = storage.get_contacts_by_ids(&ids).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, contact.id);
}
