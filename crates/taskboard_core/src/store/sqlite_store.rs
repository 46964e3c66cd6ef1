//! SQLite-backed key-value medium.
//!
//! # Invariants
//! - One row per key in `kv_entries`; `set` is an upsert.
//! - `SQLITE_FULL` surfaces as `StoreError::QuotaExceeded`.

use super::{KeyValueStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory, DbResult};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;

/// Durable medium stored in a single SQLite table.
#[derive(Debug)]
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Wraps a connection that already went through `db::open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (or creates) a database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        open_db(path).map(Self::new)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::new)
    }

    /// Caps the database file at `max_pages` pages.
    ///
    /// Returns the limit SQLite actually applied, which is never below the
    /// current page count.
    pub fn limit_pages(&self, max_pages: u32) -> DbResult<u32> {
        let applied = self.conn.query_row(
            &format!("PRAGMA max_page_count = {max_pages};"),
            [],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(applied)
    }

    /// Borrow of the underlying connection for diagnostics.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn
            .execute(
                "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![key, value],
            )
            .map_err(|err| match err.sqlite_error_code() {
                Some(ErrorCode::DiskFull) => StoreError::QuotaExceeded {
                    key: key.to_string(),
                },
                _ => StoreError::from(err),
            })?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.conn.execute("DELETE FROM kv_entries;", [])?;
        Ok(())
    }

    fn len(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteKvStore;
    use crate::store::{KeyValueStore, StoreError};

    #[test]
    fn upsert_replaces_existing_value() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn delete_of_missing_key_is_a_no_op() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.delete("missing").unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn clear_removes_every_key() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.clear().unwrap();
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn full_database_maps_to_quota_exceeded() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.set("seed", "x").unwrap();
        let current_pages: u32 = store
            .connection()
            .query_row("PRAGMA page_count;", [], |row| row.get(0))
            .unwrap();
        store.limit_pages(current_pages).unwrap();

        let huge = "x".repeat(256 * 1024);
        let err = store.set("huge", &huge).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { key } if key == "huge"));
        assert!(store.is_available());
    }
}
