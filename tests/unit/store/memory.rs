use super::*;

#[test]
fn identical_bytes_share_an_identifier() {
    let store = MemoryStore::new();
    let a = store.publish(b"png", "a").unwrap();
    let b = store.publish(b"png", "b").unwrap();
    let c = store.publish(b"other", "c").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(a.as_str().starts_with("sha256-"));
    assert_eq!(a, MemoryStore::content_id_for(b"png"));
}

#[test]
fn find_by_name_returns_every_distinct_pin() {
    let store = MemoryStore::new();
    assert!(store.find_by_name("user").unwrap().is_empty());
    let v1 = store.publish(b"v1", "user").unwrap();
    let v2 = store.publish(b"v2", "user").unwrap();
    store.publish(b"v1", "user").unwrap();
    store.publish(b"v3", "other").unwrap();
    assert_eq!(store.find_by_name("user").unwrap(), vec![v1, v2]);
}

#[test]
fn unpin_removes_and_unknown_unpin_fails() {
    let store = MemoryStore::new();
    let id = store.publish(b"v1", "user").unwrap();
    store.unpin(&id).unwrap();
    assert!(store.find_by_name("user").unwrap().is_empty());
    assert!(store.get(&id).is_none());

    let err = store.unpin(&id).unwrap_err();
    assert!(matches!(err, AvatarError::ReplaceConflict(_)));
}

#[test]
fn events_record_call_order() {
    let store = MemoryStore::new();
    let id = store.publish(b"x", "n").unwrap();
    store.find_by_name("n").unwrap();
    store.unpin(&id).unwrap();
    assert_eq!(
        store.events(),
        vec![
            StoreEvent::Publish {
                name: "n".to_string(),
                cid: id.clone()
            },
            StoreEvent::Find("n".to_string()),
            StoreEvent::Unpin(id),
        ]
    );
}
