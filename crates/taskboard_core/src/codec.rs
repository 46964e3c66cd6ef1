//! JSON codec for stored todos, projects and the project index.
//!
//! # Responsibility
//! - Encode entities into the flat JSON records kept in the key-value store.
//! - Decode records back into plain field values for restoration.
//!
//! # Invariants
//! - Todo records carry `title, description, dueDate, priority, id, done`.
//! - Project records carry `name, id, todos` where `todos` lists todo ids
//!   only; todo bodies are never embedded in a project record.
//! - `dueDate` is RFC 3339 UTC with millisecond precision and a `Z` suffix.

use crate::model::project::Project;
use crate::model::todo::{coerce_priority, Todo, TodoFields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

/// Failure to encode or decode a stored record.
#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed record: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Stored shape of a todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRecord {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "iso_millis")]
    pub due_date: DateTime<Utc>,
    /// Raw level; validated when turned into `TodoFields`.
    #[serde(default)]
    pub priority: i64,
    pub id: String,
    #[serde(default)]
    pub done: bool,
}

impl TodoRecord {
    /// Converts into entity fields, coercing an out-of-range priority.
    pub fn into_fields(self) -> TodoFields {
        TodoFields {
            id: self.id,
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            priority: coerce_priority(self.priority),
            done: self.done,
        }
    }
}

impl From<&Todo> for TodoRecord {
    fn from(todo: &Todo) -> Self {
        Self {
            title: todo.title().to_string(),
            description: todo.description().to_string(),
            due_date: todo.due_date(),
            priority: i64::from(todo.priority()),
            id: todo.id().to_string(),
            done: todo.done(),
        }
    }
}

/// Stored shape of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub todos: Vec<String>,
}

impl From<&Project> for ProjectRecord {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name().to_string(),
            id: project.id().to_string(),
            todos: project
                .todo_ids()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

pub fn encode_todo(todo: &Todo) -> CodecResult<String> {
    Ok(serde_json::to_string(&TodoRecord::from(todo))?)
}

pub fn decode_todo(raw: &str) -> CodecResult<TodoRecord> {
    Ok(serde_json::from_str(raw)?)
}

pub fn encode_project(project: &Project) -> CodecResult<String> {
    Ok(serde_json::to_string(&ProjectRecord::from(project))?)
}

pub fn decode_project(raw: &str) -> CodecResult<ProjectRecord> {
    Ok(serde_json::from_str(raw)?)
}

pub fn encode_project_ids(ids: &[String]) -> CodecResult<String> {
    Ok(serde_json::to_string(ids)?)
}

pub fn decode_project_ids(raw: &str) -> CodecResult<Vec<String>> {
    Ok(serde_json::from_str(raw)?)
}

/// RFC 3339 dates at millisecond precision.
///
/// Years outside `0000..=9999` are written with a sign (`+10000-01-01T..`,
/// `-0001-01-01T..`), which plain RFC 3339 parsing rejects; `parse` reads
/// them back, including six-digit forms such as `+010000`.
mod iso_millis {
    use chrono::{DateTime, Datelike, ParseError, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse(raw: &str) -> Result<DateTime<Utc>, ParseError> {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => Ok(parsed.with_timezone(&Utc)),
            Err(err) => parse_signed_year(raw).ok_or(err),
        }
    }

    fn parse_signed_year(raw: &str) -> Option<DateTime<Utc>> {
        if !raw.starts_with(|c| c == '+' || c == '-') {
            return None;
        }
        let year_end = 1 + raw[1..].find('-')?;
        let year: i32 = raw[..year_end].parse().ok()?;
        // 2000 is a leap year, so Feb 29 survives until `with_year` checks it.
        let anchored = DateTime::parse_from_rfc3339(&format!("2000{}", &raw[year_end..])).ok()?;
        anchored
            .with_year(year)
            .map(|parsed| parsed.with_timezone(&Utc))
    }
}
