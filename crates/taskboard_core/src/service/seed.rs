//! Startup fixture data.
//!
//! Wipes storage and writes two small projects through the normal entity
//! paths, so the fixture exercises the same write-through as user edits.

use crate::model::project::Project;
use crate::model::todo::{Priority, Todo};
use crate::storage::{Storage, StorageResult};
use chrono::{DateTime, Duration, Utc};
use log::info;
use std::rc::Rc;

/// Replaces all stored data with the fixture projects, due dates counted
/// from `now`.
///
/// # Errors
/// - Returns the wipe failure; nothing is written in that case.
pub fn seed_test_data(storage: &Rc<Storage>, now: DateTime<Utc>) -> StorageResult<Vec<Project>> {
    storage.delete_all()?;

    let mut first_todo = Todo::new(storage, "Test1", "Order this", now, Priority::Low);
    first_todo.set_title("Thinger-ma-jobbie");
    let second_todo = Todo::new(
        storage,
        "Doohickey",
        "Order that",
        now + Duration::days(1),
        Priority::High,
    );
    let third_todo = Todo::new(
        storage,
        "Mow the lawn",
        "Trim the edges, blow off the sidewalk",
        now + Duration::days(2),
        Priority::Medium,
    );

    let mut shopping = Project::new(storage, "Test PJ1");
    shopping.set_name("Amazon");
    let mut chores = Project::new(storage, "Honey-do");

    // Fresh ids cannot collide.
    let _ = shopping.add_todo(first_todo);
    let _ = shopping.add_todo(second_todo);
    let _ = chores.add_todo(third_todo);

    info!("event=seed module=service status=ok projects=2 todos=3");
    Ok(vec![shopping, chores])
}
