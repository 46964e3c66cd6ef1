//! Domain entities: projects and the todos they own.
//!
//! # Invariants
//! - Every entity is identified by an opaque string id that doubles as its
//!   storage key.
//! - Every mutation writes through to storage before the call returns.
//! - A todo belongs to at most one project.

pub mod project;
pub mod todo;
