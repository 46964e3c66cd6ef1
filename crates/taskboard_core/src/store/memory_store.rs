//! In-process key-value medium.
//!
//! Used for headless sessions and tests. Supports an optional byte quota,
//! an on/off switch emulating a medium that cannot be reached, and a write
//! journal for observing write-through behaviour.

use super::{KeyValueStore, StoreError, StoreResult, PROBE_KEY};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    quota_bytes: Cell<Option<usize>>,
    disabled: Cell<bool>,
    writes: RefCell<HashMap<String, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose total key+value size may not exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        let store = Self::default();
        store.quota_bytes.set(Some(bytes));
        store
    }

    /// Makes every operation fail with `StoreError::Disabled` while set.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
    }

    pub fn set_quota(&self, bytes: Option<usize>) {
        self.quota_bytes.set(bytes);
    }

    /// Number of successful writes to `key` since creation.
    ///
    /// Probe writes are not journaled.
    pub fn write_count(&self, key: &str) -> usize {
        self.writes.borrow().get(key).copied().unwrap_or(0)
    }

    /// Total successful writes across all non-probe keys.
    pub fn total_writes(&self) -> usize {
        self.writes.borrow().values().sum()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    fn ensure_enabled(&self) -> StoreResult<()> {
        if self.disabled.get() {
            return Err(StoreError::Disabled);
        }
        Ok(())
    }

    fn used_bytes_after(&self, key: &str, value: &str) -> usize {
        let entries = self.entries.borrow();
        let others: usize = entries
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, stored)| existing.len() + stored.len())
            .sum();
        others + key.len() + value.len()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.ensure_enabled()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.ensure_enabled()?;
        if let Some(quota) = self.quota_bytes.get() {
            if self.used_bytes_after(key, value) > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                });
            }
        }

        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        if key != PROBE_KEY {
            *self.writes.borrow_mut().entry(key.to_string()).or_insert(0) += 1;
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.ensure_enabled()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        self.ensure_enabled()?;
        self.entries.borrow_mut().clear();
        Ok(())
    }

    fn len(&self) -> StoreResult<usize> {
        self.ensure_enabled()?;
        Ok(self.entries.borrow().len())
    }
}
