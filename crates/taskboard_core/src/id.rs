//! Identifier generation for projects and todos.
//!
//! # Responsibility
//! - Produce opaque, unique string IDs for newly created entities.
//!
//! # Invariants
//! - IDs start with a millisecond timestamp and end with random bits
//!   (UUIDv7 layout).
//! - Generation has no failure mode and keeps no external state.

use uuid::Uuid;

/// Returns a fresh entity identifier.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::new_id;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_across_rapid_calls() {
        let ids: HashSet<String> = (0..1_000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn ids_are_non_empty_and_trimmed() {
        let id = new_id();
        assert!(!id.is_empty());
        assert_eq!(id.trim(), id);
    }
}
