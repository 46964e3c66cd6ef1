//! Durable registry of every project id.
//!
//! # Invariants
//! - Stored as a JSON array under `PROJECT_IDS_KEY`.
//! - Append-only: ids keep first-registration order and never repeat.
//! - The registry is the only way to enumerate projects at startup.

use crate::codec;
use crate::storage::{entity_key, Storage, StorageResult};

/// Well-known key holding the project id list.
pub const PROJECT_IDS_KEY: &str = "projectIds";

impl Storage {
    /// Appends `id` to the registry unless already present, then saves the
    /// full list.
    ///
    /// Blank and reserved ids are rejected with `InvalidKey` and leave the
    /// registry untouched.
    pub fn register_project_id(&self, id: &str) -> StorageResult<()> {
        self.logged("project_register", id, || {
            let id = entity_key(id)?;
            let mut ids = self.read_project_ids()?;
            if !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
            let encoded = codec::encode_project_ids(&ids)?;
            self.backend().set(PROJECT_IDS_KEY, &encoded)?;
            Ok(())
        })
    }

    /// Lists registered project ids in registration order.
    ///
    /// An empty registry yields an empty list.
    pub fn list_project_ids(&self) -> StorageResult<Vec<String>> {
        self.logged("project_ids_list", PROJECT_IDS_KEY, || self.read_project_ids())
    }

    fn read_project_ids(&self) -> StorageResult<Vec<String>> {
        self.ensure_available()?;
        match self.backend().get(PROJECT_IDS_KEY)? {
            Some(raw) => Ok(codec::decode_project_ids(&raw)?),
            None => Ok(Vec::new()),
        }
    }
}
