//! Project entity.
//!
//! # Responsibility
//! - Own an ordered, id-keyed collection of todos.
//! - Write the project record (name + todo ids) through on every mutation
//!   of its name or membership.
//!
//! # Invariants
//! - Todo ids inside one project are unique; insertion order is display
//!   order.
//! - The stored project record references todos by id only; todo records
//!   are stored independently under their own ids.
//! - Removing a todo does not delete its stored record; the coordinator
//!   owns that step.

use crate::id::new_id;
use crate::model::todo::{Todo, TodoId};
use crate::storage::Storage;
use log::{error, trace};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// Stable identifier of a project; also its storage key.
pub type ProjectId = String;

/// Rejected membership change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    /// A todo with the same id is already a member.
    DuplicateTodo { project_id: ProjectId, todo_id: TodoId },
}

impl Display for ProjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateTodo {
                project_id,
                todo_id,
            } => write!(f, "todo {todo_id} already belongs to project {project_id}"),
        }
    }
}

impl Error for ProjectError {}

/// A project bound to the storage it writes through to.
pub struct Project {
    id: ProjectId,
    name: String,
    todos: Vec<Todo>,
    storage: Rc<Storage>,
}

impl Project {
    /// Creates a project with a generated ID, registers it in the project
    /// index, and saves it.
    pub fn new(storage: &Rc<Storage>, name: impl Into<String>) -> Self {
        Self::with_id(storage, new_id(), name)
    }

    /// Same as `new` with a caller-provided ID.
    pub fn with_id(storage: &Rc<Storage>, id: impl Into<ProjectId>, name: impl Into<String>) -> Self {
        let project = Self {
            id: id.into(),
            name: name.into(),
            todos: Vec::new(),
            storage: Rc::clone(storage),
        };
        // Logged by `Storage`; an unregistered project still works for the
        // current session.
        let _ = project.storage.register_project_id(&project.id);
        trace!("event=project_create module=model status=ok id={}", project.id);
        project.persist();
        project
    }

    /// Empty shell used while reconstructing a stored project.
    pub(crate) fn restored(storage: Rc<Storage>, id: ProjectId, name: String) -> Self {
        Self {
            id,
            name,
            todos: Vec::new(),
            storage,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member todos in display order.
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn todo_ids(&self) -> Vec<&str> {
        self.todos.iter().map(Todo::id).collect()
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn contains(&self, todo_id: &str) -> bool {
        self.position(todo_id).is_some()
    }

    pub fn todo(&self, todo_id: &str) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id() == todo_id)
    }

    /// Mutable access for field edits; todo setters write through on their
    /// own, membership is unaffected.
    pub fn todo_mut(&mut self, todo_id: &str) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|todo| todo.id() == todo_id)
    }

    /// Renames the project and writes through.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.persist();
    }

    /// Appends a todo and writes the project through.
    ///
    /// # Errors
    /// - `ProjectError::DuplicateTodo` when the id is already a member; the
    ///   project is left unchanged.
    pub fn add_todo(&mut self, todo: Todo) -> Result<(), ProjectError> {
        if self.contains(todo.id()) {
            error!(
                "event=project_add_todo module=model status=error error_code=duplicate_todo project_id={} todo_id={}",
                self.id,
                todo.id()
            );
            return Err(ProjectError::DuplicateTodo {
                project_id: self.id.clone(),
                todo_id: todo.id().to_string(),
            });
        }

        trace!(
            "event=project_add_todo module=model status=ok project_id={} todo_id={}",
            self.id,
            todo.id()
        );
        self.todos.push(todo);
        self.persist();
        Ok(())
    }

    /// Removes a todo by id and writes the project through.
    ///
    /// The write happens even when the id was not a member. Returns the
    /// removed todo.
    pub fn delete_todo(&mut self, todo_id: &str) -> Option<Todo> {
        let removed = self.position(todo_id).map(|index| self.todos.remove(index));
        trace!(
            "event=project_delete_todo module=model status=ok project_id={} todo_id={todo_id} removed={}",
            self.id,
            removed.is_some()
        );
        self.persist();
        removed
    }

    /// Attaches a restored todo without writing the project.
    ///
    /// Bulk reconstruction is read-only: the stored id list is already the
    /// source of what is being attached.
    pub(crate) fn attach_restored(&mut self, todo: Todo) -> bool {
        if self.contains(todo.id()) {
            return false;
        }
        self.todos.push(todo);
        true
    }

    fn position(&self, todo_id: &str) -> Option<usize> {
        self.todos.iter().position(|todo| todo.id() == todo_id)
    }

    fn persist(&self) {
        let _ = self.storage.save_project(self);
    }
}

impl Debug for Project {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("todos", &self.todos)
            .finish_non_exhaustive()
    }
}
