//! To-do domain record.
//!
//! # Responsibility
//! - Define the canonical to-do shape (title, done flag, order).
//! - Implement the cross-client done-flag decoding policy.
//!
//! # Invariants
//! - `key` is stable and never reused for another record.
//! - `done` stays in whatever wire encoding the record arrived with; only
//!   `toggle_done` rewrites it, and always to an encoding `is_done` decodes.
//! - `order` has no uniqueness constraint; duplicates and gaps are tolerated.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a to-do record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TodoKey = Uuid;

/// Integer wire value meaning "completed".
pub const DONE: i64 = 1;
/// Integer wire value meaning "not completed".
pub const NOT_DONE: i64 = 0;

/// Wire-faithful done flag.
///
/// Two historical clients of the same sync service wrote this field with
/// different types: one as integer 1/0, one as a native boolean. The record
/// keeps whichever encoding it was loaded with so a save does not silently
/// rewrite data another client owns.
///
/// The untagged variant order matters: integer decode is tried before
/// boolean, which is exactly the compatibility precedence callers rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DoneValue {
    /// Integer encoding, 1 meaning done.
    Flag(i64),
    /// Native boolean encoding.
    Bool(bool),
}

/// Typed to-do record.
///
/// Fields other than `key` are optional on purpose: remote records may omit
/// any of them, and the defaults live in the accessors instead of being baked
/// into storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    /// Stable key assigned by the store at creation.
    pub key: TodoKey,
    /// Absent decodes as the empty string.
    pub title: Option<String>,
    /// Absent decodes as not done.
    pub done: Option<DoneValue>,
    /// Display/sort position. Absent records sort first.
    pub order: Option<i64>,
}

impl Todo {
    /// Creates a record with a caller-provided key and schema defaults.
    ///
    /// Used by the store's `new_object`; everything else receives records by
    /// decoding persisted property bags.
    pub fn with_key(key: TodoKey) -> Self {
        Self {
            key,
            title: None,
            done: Some(DoneValue::Flag(NOT_DONE)),
            order: None,
        }
    }

    /// Returns the title, defaulting to the empty string when absent.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Returns whether this record is completed.
    ///
    /// Decoding precedence, tolerant of both historical wire encodings:
    /// 1. field decodes as an integer: done iff the integer equals [`DONE`];
    /// 2. field decodes as a boolean: that boolean;
    /// 3. field absent or any other shape: not done.
    pub fn is_done(&self) -> bool {
        match self.done {
            Some(DoneValue::Flag(value)) => value == DONE,
            Some(DoneValue::Bool(value)) => value,
            None => false,
        }
    }

    /// Flips the completed state.
    ///
    /// Writes the integer encoding regardless of what the record carried, so
    /// the result always round-trips through `is_done`. Applying this twice
    /// restores the original `is_done` result.
    pub fn toggle_done(&mut self) {
        let next = if self.is_done() { NOT_DONE } else { DONE };
        self.done = Some(DoneValue::Flag(next));
    }

    /// Replaces the title unconditionally. Empty titles are valid.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Replaces the sort position unconditionally.
    pub fn set_order(&mut self, order: i64) {
        self.order = Some(order);
    }
}

#[cfg(test)]
mod tests {
    use super::{DoneValue, Todo, DONE, NOT_DONE};
    use uuid::Uuid;

    #[test]
    fn with_key_sets_schema_defaults() {
        let todo = Todo::with_key(Uuid::new_v4());
        assert_eq!(todo.title(), "");
        assert_eq!(todo.done, Some(DoneValue::Flag(NOT_DONE)));
        assert!(!todo.is_done());
        assert_eq!(todo.order, None);
    }

    #[test]
    fn integer_done_is_true_only_for_one() {
        for value in [-3_i64, -1, 0, 2, 7, i64::MAX] {
            let mut todo = Todo::with_key(Uuid::new_v4());
            todo.done = Some(DoneValue::Flag(value));
            assert!(!todo.is_done(), "flag {value} must decode as not done");
        }

        let mut todo = Todo::with_key(Uuid::new_v4());
        todo.done = Some(DoneValue::Flag(DONE));
        assert!(todo.is_done());
    }

    #[test]
    fn boolean_done_decodes_as_itself() {
        let mut todo = Todo::with_key(Uuid::new_v4());
        todo.done = Some(DoneValue::Bool(true));
        assert!(todo.is_done());
        todo.done = Some(DoneValue::Bool(false));
        assert!(!todo.is_done());
    }

    #[test]
    fn missing_done_decodes_as_not_done() {
        let mut todo = Todo::with_key(Uuid::new_v4());
        todo.done = None;
        assert!(!todo.is_done());
    }

    #[test]
    fn toggle_is_an_involution_under_is_done() {
        let starts = [
            None,
            Some(DoneValue::Flag(NOT_DONE)),
            Some(DoneValue::Flag(DONE)),
            Some(DoneValue::Flag(5)),
            Some(DoneValue::Bool(true)),
            Some(DoneValue::Bool(false)),
        ];

        for start in starts {
            let mut todo = Todo::with_key(Uuid::new_v4());
            todo.done = start;
            let before = todo.is_done();
            todo.toggle_done();
            assert_eq!(todo.is_done(), !before);
            todo.toggle_done();
            assert_eq!(todo.is_done(), before);
        }
    }

    #[test]
    fn untagged_decode_prefers_integer_then_boolean() {
        let flag: DoneValue = serde_json::from_value(serde_json::json!(1)).unwrap();
        assert_eq!(flag, DoneValue::Flag(1));

        let flag: DoneValue = serde_json::from_value(serde_json::json!(true)).unwrap();
        assert_eq!(flag, DoneValue::Bool(true));

        assert!(serde_json::from_value::<DoneValue>(serde_json::json!("yes")).is_err());
        assert!(serde_json::from_value::<DoneValue>(serde_json::json!(1.5)).is_err());
    }
}
