mod common;

use common::{capture_logs, due, logged, memory_storage};
use log::Level;
use taskboard_core::codec::decode_project;
use taskboard_core::{KeyValueStore, Priority, Project, ProjectError, Todo, PROJECT_IDS_KEY};

#[test]
fn new_project_registers_and_saves_itself() {
    let (store, storage) = memory_storage();

    let project = Project::new(&storage, "Home");

    assert_eq!(storage.list_project_ids().unwrap(), vec![project.id().to_string()]);
    let record = decode_project(&store.get(project.id()).unwrap().unwrap()).unwrap();
    assert_eq!(record.name, "Home");
    assert_eq!(record.id, project.id());
    assert!(record.todos.is_empty());
}

#[test]
fn stored_project_lists_todo_ids_only_in_insertion_order() {
    let (store, storage) = memory_storage();
    let mut project = Project::with_id(&storage, "p1", "Errands");
    let first = Todo::with_id(&storage, "t1", "Bank", "", due(1), Priority::Low);
    let second = Todo::with_id(&storage, "t2", "Post office", "", due(2), Priority::None);

    project.add_todo(first).unwrap();
    project.add_todo(second).unwrap();

    let raw = store.get("p1").unwrap().unwrap();
    assert_eq!(raw, r#"{"name":"Errands","id":"p1","todos":["t1","t2"]}"#);
}

#[test]
fn project_restores_with_resolvable_todos_in_order() {
    let (store, storage) = memory_storage();
    let mut project = Project::with_id(&storage, "p1", "Errands");
    for (id, day) in [("t1", 1), ("t2", 2), ("t3", 3)] {
        project
            .add_todo(Todo::with_id(&storage, id, id, "", due(day), Priority::Low))
            .unwrap();
    }
    store.delete("t2").unwrap();

    let restored = storage.restore_project("p1").unwrap();

    assert_eq!(restored.id(), "p1");
    assert_eq!(restored.name(), "Errands");
    assert_eq!(restored.todo_ids(), vec!["t1", "t3"]);
}

#[test]
fn restore_skips_dangling_ids_with_one_warning_and_writes_nothing() {
    capture_logs();
    let (store, storage) = memory_storage();
    store
        .set("p1", r#"{"name":"Errands","id":"p1","todos":["t1","gone","t1"]}"#)
        .unwrap();
    let _t1 = Todo::with_id(&storage, "t1", "Bank", "", due(1), Priority::Low);
    let writes = store.total_writes();

    let project = storage.restore_project("p1").unwrap();

    assert_eq!(project.todo_ids(), vec!["t1"]);
    assert_eq!(store.total_writes(), writes);
    let warnings = logged(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("todo_id=gone"));
    assert!(warnings[0].contains("missing_record"));
}

#[test]
fn add_todo_writes_project_through() {
    let (store, storage) = memory_storage();
    let mut project = Project::new(&storage, "Home");
    let before = store.write_count(project.id());

    project
        .add_todo(Todo::new(&storage, "a", "b", due(1), Priority::None))
        .unwrap();

    assert_eq!(store.write_count(project.id()), before + 1);
    assert_eq!(project.len(), 1);
}

#[test]
fn duplicate_todo_is_rejected_without_state_change() {
    capture_logs();
    let (store, storage) = memory_storage();
    let mut project = Project::with_id(&storage, "p1", "Home");
    project
        .add_todo(Todo::with_id(&storage, "t1", "a", "", due(1), Priority::None))
        .unwrap();
    let writes = store.write_count("p1");

    let err = project
        .add_todo(Todo::with_id(&storage, "t1", "b", "", due(2), Priority::None))
        .unwrap_err();

    assert_eq!(
        err,
        ProjectError::DuplicateTodo {
            project_id: "p1".to_string(),
            todo_id: "t1".to_string(),
        }
    );
    assert_eq!(project.len(), 1);
    assert_eq!(project.todo("t1").unwrap().title(), "a");
    assert_eq!(store.write_count("p1"), writes);
    assert!(logged(Level::Error)
        .iter()
        .any(|message| message.contains("duplicate_todo")));
}

#[test]
fn delete_todo_removes_membership_but_keeps_todo_record() {
    let (store, storage) = memory_storage();
    let mut project = Project::with_id(&storage, "p1", "Home");
    project
        .add_todo(Todo::with_id(&storage, "t1", "a", "", due(1), Priority::None))
        .unwrap();

    let removed = project.delete_todo("t1").unwrap();

    assert_eq!(removed.id(), "t1");
    assert!(!project.contains("t1"));
    assert!(store.get("t1").unwrap().is_some());
    assert!(storage.restore_project("p1").unwrap().is_empty());
}

#[test]
fn delete_of_unknown_todo_still_writes_through() {
    let (store, storage) = memory_storage();
    let mut project = Project::with_id(&storage, "p1", "Home");
    let writes = store.write_count("p1");

    assert!(project.delete_todo("nope").is_none());
    assert_eq!(store.write_count("p1"), writes + 1);
}

#[test]
fn rename_writes_through() {
    let (_store, storage) = memory_storage();
    let mut project = Project::with_id(&storage, "p1", "Test PJ1");

    project.set_name("Amazon");

    assert_eq!(storage.restore_project("p1").unwrap().name(), "Amazon");
}

#[test]
fn todo_edits_through_project_persist_on_the_todo_record() {
    let (store, storage) = memory_storage();
    let mut project = Project::with_id(&storage, "p1", "Home");
    project
        .add_todo(Todo::with_id(&storage, "t1", "a", "", due(1), Priority::None))
        .unwrap();
    let project_writes = store.write_count("p1");

    project.todo_mut("t1").unwrap().set_done(true);

    assert!(storage.restore_todo("t1").unwrap().done());
    assert_eq!(store.write_count("p1"), project_writes);
}

#[test]
fn registry_is_append_only_and_deduplicated() {
    let (store, storage) = memory_storage();
    storage.register_project_id("p1").unwrap();
    storage.register_project_id("p2").unwrap();
    storage.register_project_id("p1").unwrap();

    assert_eq!(storage.list_project_ids().unwrap(), vec!["p1", "p2"]);
    assert_eq!(store.get(PROJECT_IDS_KEY).unwrap().unwrap(), r#"["p1","p2"]"#);
}

#[test]
fn todo_record_id_wins_over_its_key_with_a_warning() {
    capture_logs();
    let (store, storage) = memory_storage();
    store
        .set(
            "t1",
            r#"{"title":"Bank","description":"","dueDate":"2024-06-01T12:00:00.000Z","priority":1,"id":"t9","done":false}"#,
        )
        .unwrap();

    let todo = storage.restore_todo("t1").unwrap();

    assert_eq!(todo.id(), "t9");
    let warnings = logged(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("id_mismatch") && warnings[0].contains("record_id=t9"));
}

#[test]
fn mismatched_todo_record_is_attached_once_per_record_id() {
    let (store, storage) = memory_storage();
    let _t9 = Todo::with_id(&storage, "t9", "Bank", "", due(1), Priority::Low);
    store
        .set(
            "t1",
            r#"{"title":"Bank copy","description":"","dueDate":"2024-06-01T12:00:00.000Z","priority":1,"id":"t9","done":false}"#,
        )
        .unwrap();
    store
        .set("p1", r#"{"name":"Errands","id":"p1","todos":["t9","t1"]}"#)
        .unwrap();
    let writes = store.total_writes();

    let restored = storage.restore_project("p1").unwrap();

    assert_eq!(restored.todo_ids(), vec!["t9"]);
    assert_eq!(restored.todos()[0].title(), "Bank");
    assert_eq!(store.total_writes(), writes);
}
