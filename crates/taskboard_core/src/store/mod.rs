//! Key-value store adapter over a durable, synchronous medium.
//!
//! # Responsibility
//! - Define the string-keyed contract every storage medium implements.
//! - Detect medium availability (including quota exhaustion) with a
//!   write/delete probe.
//!
//! # Invariants
//! - All operations complete synchronously before returning.
//! - A successful `set` is observable by the next `get` on the same thread.
//! - The probe key never survives a successful probe.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_store;
pub mod sqlite_store;

pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteKvStore;

/// Key written and removed by the availability probe.
pub const PROBE_KEY: &str = "__storage_test__";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a storage medium.
#[derive(Debug)]
pub enum StoreError {
    /// The medium refused a write because it is full.
    QuotaExceeded { key: String },
    /// The medium cannot be reached at all.
    Disabled,
    /// SQLite-level failure.
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuotaExceeded { key } => write!(f, "storage quota exceeded while writing `{key}`"),
            Self::Disabled => write!(f, "storage medium is disabled"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::QuotaExceeded { .. } | Self::Disabled => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable string-keyed storage medium.
///
/// Implementations use interior mutability: one medium is shared by every
/// entity of a session on a single thread.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn delete(&self, key: &str) -> StoreResult<()>;
    /// Removes every key, including keys not written by this crate.
    fn clear(&self) -> StoreResult<()>;
    /// Number of stored keys.
    fn len(&self) -> StoreResult<usize>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Probes the medium with a write followed by a delete.
    ///
    /// A full medium still counts as available when it already holds data,
    /// because existing records remain readable.
    fn is_available(&self) -> bool {
        let probe = self
            .set(PROBE_KEY, PROBE_KEY)
            .and_then(|()| self.delete(PROBE_KEY));
        match probe {
            Ok(()) => true,
            Err(StoreError::QuotaExceeded { .. }) => {
                matches!(self.is_empty(), Ok(false))
            }
            Err(_) => false,
        }
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn clear(&self) -> StoreResult<()> {
        (**self).clear()
    }

    fn len(&self) -> StoreResult<usize> {
        (**self).len()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}
