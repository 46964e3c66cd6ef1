//! Todo entity.
//!
//! # Responsibility
//! - Hold one actionable item with its due date, priority and done flag.
//! - Write the item through to storage after every mutation.
//!
//! # Invariants
//! - `id` is assigned once and never changes.
//! - `priority` is always within `Priority::None..=Priority::High`.
//! - `due_date` is kept at millisecond precision, matching the stored format.
//! - Restored todos are not saved again until they are mutated.

use crate::id::new_id;
use crate::storage::Storage;
use chrono::{DateTime, SubsecRound, Utc};
use log::{error, trace};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Stable identifier of a todo; also its storage key.
pub type TodoId = String;

/// Urgency of a todo, stored as an integer level `0..=3`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::None, Self::Low, Self::Medium, Self::High];

    /// Maps a stored level back to a priority; `None` when out of range.
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(Self::None),
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            3 => Some(Self::High),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            other => other.parse::<i64>().ok().and_then(Self::from_level),
        }
    }
}

impl From<Priority> for i64 {
    fn from(value: Priority) -> Self {
        i64::from(value.level())
    }
}

/// Coerces a raw level into a valid priority.
///
/// Out-of-range levels become `Priority::None` and are reported at error
/// level; the caller always gets a usable value.
pub(crate) fn coerce_priority(level: i64) -> Priority {
    Priority::from_level(level).unwrap_or_else(|| {
        error!(
            "event=priority_invalid module=model status=error level={level} fallback=none"
        );
        Priority::None
    })
}

fn truncate_due_date(due_date: DateTime<Utc>) -> DateTime<Utc> {
    due_date.trunc_subsecs(3)
}

/// Plain field values of a todo, detached from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoFields {
    pub id: TodoId,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub done: bool,
}

/// A todo bound to the storage it writes through to.
pub struct Todo {
    id: TodoId,
    title: String,
    description: String,
    due_date: DateTime<Utc>,
    priority: Priority,
    done: bool,
    storage: Rc<Storage>,
}

impl Todo {
    /// Creates a new todo with a generated ID and saves it.
    ///
    /// `priority` accepts a `Priority` or a raw level; out-of-range levels
    /// are coerced to `Priority::None`.
    pub fn new(
        storage: &Rc<Storage>,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
        priority: impl Into<i64>,
    ) -> Self {
        Self::with_id(storage, new_id(), title, description, due_date, priority)
    }

    /// Creates a new todo with a caller-provided ID and saves it.
    pub fn with_id(
        storage: &Rc<Storage>,
        id: impl Into<TodoId>,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
        priority: impl Into<i64>,
    ) -> Self {
        let todo = Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            due_date: truncate_due_date(due_date),
            priority: coerce_priority(priority.into()),
            done: false,
            storage: Rc::clone(storage),
        };
        trace!("event=todo_create module=model status=ok id={}", todo.id);
        todo.persist();
        todo
    }

    /// Rebuilds a todo from stored fields without saving it.
    pub(crate) fn restored(storage: Rc<Storage>, fields: TodoFields) -> Self {
        Self {
            id: fields.id,
            title: fields.title,
            description: fields.description,
            due_date: truncate_due_date(fields.due_date),
            priority: fields.priority,
            done: fields.done,
            storage,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn done(&self) -> bool {
        self.done
    }

    /// Snapshot of the current field values.
    pub fn fields(&self) -> TodoFields {
        TodoFields {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            priority: self.priority,
            done: self.done,
        }
    }

    /// Sets the title and writes through.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.persist();
    }

    /// Sets the description and writes through.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.persist();
    }

    /// Sets the due date and writes through.
    pub fn set_due_date(&mut self, due_date: DateTime<Utc>) {
        self.due_date = truncate_due_date(due_date);
        self.persist();
    }

    /// Sets the priority and writes through.
    ///
    /// Out-of-range levels are stored as `Priority::None`. The returned value
    /// is the priority actually applied.
    pub fn set_priority(&mut self, priority: impl Into<i64>) -> Priority {
        self.priority = coerce_priority(priority.into());
        trace!(
            "event=todo_priority module=model status=ok id={} level={}",
            self.id,
            self.priority.level()
        );
        self.persist();
        self.priority
    }

    /// Sets the done flag and writes through.
    pub fn set_done(&mut self, done: bool) {
        self.done = done;
        self.persist();
    }

    /// Flips the done flag, writes through, and returns the new value.
    pub fn toggle_done(&mut self) -> bool {
        self.set_done(!self.done);
        self.done
    }

    // Failures were already logged by `Storage`; the in-memory value stays
    // authoritative for the session.
    fn persist(&self) {
        let _ = self.storage.save_todo(self);
    }
}

impl Debug for Todo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Todo")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("due_date", &self.due_date)
            .field("priority", &self.priority)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
