mod common;

use common::{capture_logs, due, logged, memory_storage};
use log::Level;
use std::rc::Rc;
use taskboard_core::{
    KeyValueStore, MemoryStore, Priority, Project, Storage, StorageError, Todo, PROJECT_IDS_KEY,
};

#[test]
fn disabled_medium_is_consistently_unavailable_until_reenabled() {
    let (store, storage) = memory_storage();
    store.set_disabled(true);

    for _ in 0..3 {
        assert!(!storage.is_available());
    }

    store.set_disabled(false);
    assert!(storage.is_available());
}

#[test]
fn saves_on_unavailable_medium_are_dropped_and_logged() {
    capture_logs();
    let (store, storage) = memory_storage();
    store.set_disabled(true);

    let todo = Todo::with_id(&storage, "t1", "a", "b", due(1), Priority::Low);
    let project = Project::with_id(&storage, "p1", "Home");

    assert_eq!(todo.title(), "a");
    assert_eq!(project.name(), "Home");
    store.set_disabled(false);
    assert!(store.keys().is_empty());
    let errors = logged(Level::Error);
    assert!(errors.iter().any(|line| line.contains("event=todo_save")));
    assert!(errors.iter().any(|line| line.contains("event=project_register")));
    assert!(errors.iter().any(|line| line.contains("event=project_save")));
    assert!(errors.iter().all(|line| line.contains("store_unavailable")));
}

#[test]
fn full_medium_with_data_stays_available_but_rejects_large_writes() {
    capture_logs();
    let store = Rc::new(MemoryStore::new());
    let storage = Storage::shared(Rc::clone(&store));
    let mut todo = Todo::with_id(&storage, "t1", "a", "b", due(1), Priority::Low);
    let used: usize = store
        .keys()
        .iter()
        .map(|key| key.len() + store.get(key).unwrap().unwrap().len())
        .sum();
    store.set_quota(Some(used));

    assert!(storage.is_available());
    todo.set_description("a much longer description than before");

    let restored = storage.restore_todo("t1").unwrap();
    assert_eq!(restored.description(), "b");
    assert!(logged(Level::Error)
        .iter()
        .any(|line| line.contains("store_failed")));
}

#[test]
fn full_empty_medium_is_unavailable() {
    let store = MemoryStore::with_quota(0);
    let storage = Storage::new(store);

    assert!(!storage.is_available());
    assert!(matches!(storage.list_project_ids(), Err(StorageError::Unavailable)));
}

#[test]
fn missing_records_are_reported_not_logged_as_errors() {
    capture_logs();
    let (_store, storage) = memory_storage();

    let err = storage.restore_todo("nope").unwrap_err();

    assert!(matches!(err, StorageError::MissingRecord(key) if key == "nope"));
    assert!(logged(Level::Error).is_empty());
    assert!(matches!(
        storage.restore_project("nope"),
        Err(StorageError::MissingRecord(_))
    ));
}

#[test]
fn reserved_keys_cannot_be_used_for_entities() {
    let (store, storage) = memory_storage();
    storage.register_project_id("p1").unwrap();

    assert!(matches!(
        storage.delete_item(PROJECT_IDS_KEY),
        Err(StorageError::InvalidKey(_))
    ));
    assert!(matches!(
        storage.restore_todo(""),
        Err(StorageError::InvalidKey(_))
    ));
    assert!(store.get(PROJECT_IDS_KEY).unwrap().is_some());
}

#[test]
fn delete_item_tolerates_missing_keys() {
    let (_store, storage) = memory_storage();
    storage.delete_item("never-written").unwrap();
}

#[test]
fn empty_registry_lists_no_projects() {
    let (_store, storage) = memory_storage();
    assert!(storage.list_project_ids().unwrap().is_empty());
}

#[test]
fn blank_and_reserved_project_ids_never_enter_the_registry() {
    capture_logs();
    let (store, storage) = memory_storage();
    Project::with_id(&storage, "p1", "Home");
    let before = store.get(PROJECT_IDS_KEY).unwrap();

    Project::with_id(&storage, PROJECT_IDS_KEY, "x");
    Project::with_id(&storage, "", "y");
    Project::with_id(&storage, "  ", "z");

    assert_eq!(store.get(PROJECT_IDS_KEY).unwrap(), before);
    assert_eq!(storage.list_project_ids().unwrap(), vec!["p1".to_string()]);
    assert!(matches!(
        storage.register_project_id(""),
        Err(StorageError::InvalidKey(_))
    ));
    assert!(logged(Level::Error)
        .iter()
        .any(|line| line.contains("event=project_register") && line.contains("invalid_key")));
}
