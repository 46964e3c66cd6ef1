//! Session-level use cases.
//!
//! # Responsibility
//! - Orchestrate entity and storage calls into UI-facing operations.
//! - Keep rendering behind the `Renderer` trait.

pub mod app;
pub mod seed;
