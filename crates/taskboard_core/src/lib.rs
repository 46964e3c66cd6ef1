//! Core of the taskboard task manager.
//!
//! Projects own ordered todos; both write through to a durable key-value
//! medium on every mutation and are rebuilt from it at startup.

pub mod codec;
pub mod config;
pub mod db;
pub mod id;
pub mod index;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod store;

pub use codec::{CodecError, ProjectRecord, TodoRecord};
pub use config::AppConfig;
pub use id::new_id;
pub use index::PROJECT_IDS_KEY;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::project::{Project, ProjectError, ProjectId};
pub use model::todo::{Priority, Todo, TodoFields, TodoId};
pub use service::app::{load_all, App, AppError, AppResult, NoopRenderer, Renderer};
pub use service::seed::seed_test_data;
pub use storage::{Storage, StorageError, StorageResult};
pub use store::{KeyValueStore, MemoryStore, SqliteKvStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
