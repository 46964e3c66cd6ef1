//! Persistence gateway shared by every entity of a session.
//!
//! # Responsibility
//! - Gate every read/write on a fresh medium availability probe.
//! - Encode entities on save and rebuild them on restore.
//! - Log failures once, at the point they happen.
//!
//! # Invariants
//! - Failed calls never touch in-memory entity state.
//! - Nothing is retried or queued; a failed write is lost for that call.
//! - Restoring a project never writes: dangling todo ids are skipped with a
//!   warning and the stored id list is left as it was.

use crate::codec::{self, CodecError};
use crate::index::PROJECT_IDS_KEY;
use crate::model::project::Project;
use crate::model::todo::Todo;
use crate::store::{KeyValueStore, StoreError, PROBE_KEY};
use log::{debug, error, trace, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure of a persistence call. All variants are recoverable.
#[derive(Debug)]
pub enum StorageError {
    /// The availability probe failed.
    Unavailable,
    /// Blank or reserved key used for an entity record.
    InvalidKey(String),
    /// No record stored under the key.
    MissingRecord(String),
    /// Stored record could not be encoded or decoded.
    Codec(CodecError),
    /// Medium-level failure after a successful probe.
    Store(StoreError),
}

impl StorageError {
    /// Stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable => "store_unavailable",
            Self::InvalidKey(_) => "invalid_key",
            Self::MissingRecord(_) => "missing_record",
            Self::Codec(_) => "codec_failed",
            Self::Store(_) => "store_failed",
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage is not available"),
            Self::InvalidKey(key) => write!(f, "invalid storage key `{key}`"),
            Self::MissingRecord(key) => write!(f, "no record stored under `{key}`"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Unavailable | Self::InvalidKey(_) | Self::MissingRecord(_) => None,
        }
    }
}

impl From<CodecError> for StorageError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<StoreError> for StorageError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Availability-checked access to one key-value medium.
pub struct Storage {
    backend: Box<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Wraps the medium in the shared handle entities hold on to.
    pub fn shared(backend: impl KeyValueStore + 'static) -> Rc<Self> {
        Rc::new(Self::new(backend))
    }

    /// Probes the medium. Every call performs a fresh probe.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Saves a todo under its own id.
    pub fn save_todo(&self, todo: &Todo) -> StorageResult<()> {
        self.logged("todo_save", todo.id(), || {
            self.ensure_available()?;
            let key = entity_key(todo.id())?;
            let encoded = codec::encode_todo(todo)?;
            self.backend.set(key, &encoded)?;
            Ok(())
        })
    }

    /// Rebuilds the todo stored under `key` without saving it again.
    ///
    /// When the record's own id differs from `key`, the record id wins and a
    /// warning is logged.
    pub fn restore_todo(self: &Rc<Self>, key: &str) -> StorageResult<Todo> {
        self.logged("todo_restore", key, || {
            let raw = self.read_entity(key)?;
            let record = codec::decode_todo(&raw)?;
            if record.id != key {
                warn!(
                    "event=todo_restore module=storage status=warn error_code=id_mismatch key={key} record_id={}",
                    record.id
                );
            }
            Ok(Todo::restored(Rc::clone(self), record.into_fields()))
        })
    }

    /// Saves a project record (name + ordered todo ids) under its id.
    pub fn save_project(&self, project: &Project) -> StorageResult<()> {
        self.logged("project_save", project.id(), || {
            self.ensure_available()?;
            let key = entity_key(project.id())?;
            let encoded = codec::encode_project(project)?;
            self.backend.set(key, &encoded)?;
            Ok(())
        })
    }

    /// Rebuilds the project stored under `key` and resolves its todos.
    ///
    /// Todo ids that no longer resolve are dropped with one warning each.
    /// Nothing is written back.
    pub fn restore_project(self: &Rc<Self>, key: &str) -> StorageResult<Project> {
        self.logged("project_restore", key, || {
            let raw = self.read_entity(key)?;
            let record = codec::decode_project(&raw)?;
            if record.id != key {
                warn!(
                    "event=project_restore module=storage status=warn error_code=id_mismatch key={key} record_id={}",
                    record.id
                );
            }

            let mut project = Project::restored(Rc::clone(self), record.id, record.name);
            for todo_id in &record.todos {
                if project.contains(todo_id) {
                    debug!(
                        "event=project_restore module=storage status=skip reason=duplicate_todo project_id={} todo_id={todo_id}",
                        project.id()
                    );
                    continue;
                }
                match self.restore_todo(todo_id) {
                    Ok(todo) => {
                        let restored_id = todo.id().to_string();
                        if !project.attach_restored(todo) {
                            debug!(
                                "event=project_restore module=storage status=skip reason=duplicate_todo project_id={} todo_id={restored_id}",
                                project.id()
                            );
                        }
                    }
                    Err(err) => warn!(
                        "event=project_restore module=storage status=skip reason={} project_id={} todo_id={todo_id}",
                        err.code(),
                        project.id()
                    ),
                }
            }
            Ok(project)
        })
    }

    /// Deletes the record stored under `key`. Missing keys are not an error.
    pub fn delete_item(&self, key: &str) -> StorageResult<()> {
        self.logged("item_delete", key, || {
            self.ensure_available()?;
            let key = entity_key(key)?;
            self.backend.delete(key)?;
            Ok(())
        })
    }

    /// Removes every persisted key, including the project index.
    pub fn delete_all(&self) -> StorageResult<()> {
        self.logged("delete_all", "*", || {
            self.ensure_available()?;
            self.backend.clear()?;
            Ok(())
        })
    }

    pub(crate) fn ensure_available(&self) -> StorageResult<()> {
        if self.backend.is_available() {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }

    pub(crate) fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }

    fn read_entity(&self, key: &str) -> StorageResult<String> {
        self.ensure_available()?;
        let key = entity_key(key)?;
        self.backend
            .get(key)?
            .ok_or_else(|| StorageError::MissingRecord(key.to_string()))
    }

    /// Runs one persistence call and logs its outcome.
    ///
    /// Missing records log at debug level; the caller decides how severe a
    /// miss is. Every other failure logs at error level.
    pub(crate) fn logged<T>(
        &self,
        event: &'static str,
        key: &str,
        call: impl FnOnce() -> StorageResult<T>,
    ) -> StorageResult<T> {
        trace!("event={event} module=storage status=start key={key}");
        match call() {
            Ok(value) => {
                trace!("event={event} module=storage status=ok key={key}");
                Ok(value)
            }
            Err(err @ StorageError::MissingRecord(_)) => {
                debug!("event={event} module=storage status=miss key={key}");
                Err(err)
            }
            Err(err) => {
                error!(
                    "event={event} module=storage status=error key={key} error_code={} error={err}",
                    err.code()
                );
                Err(err)
            }
        }
    }
}

impl Debug for Storage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

/// Accepts keys usable for entity records.
pub(crate) fn entity_key(key: &str) -> StorageResult<&str> {
    if key.trim().is_empty() || key == PROJECT_IDS_KEY || key == PROBE_KEY {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(key)
}
