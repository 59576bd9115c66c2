//! Property-bag schema for the `todo` bucket.
//!
//! # Responsibility
//! - Name the bucket and its indexed properties in one place.
//! - Convert between the store's loosely-typed JSON property bags and the
//!   typed [`Todo`] record.
//!
//! # Invariants
//! - Decoding never fails: unrecognized property shapes fall back to absent,
//!   and the accessors on `Todo` supply defaults.
//! - Encoding writes only present fields, so a record never invents
//!   properties another client did not store.

use crate::model::todo::{DoneValue, Todo, TodoKey};
use serde_json::{Map, Value};

/// Remote bucket name for to-do records.
pub const BUCKET_NAME: &str = "todo";

/// Property holding the completed flag.
pub const DONE_PROPERTY: &str = "done";
/// Property holding the display title.
pub const TITLE_PROPERTY: &str = "title";
/// Property holding the sort position.
pub const ORDER_PROPERTY: &str = "order";

/// Builds a typed record from a persisted property bag.
///
/// Each property is decoded independently; a property that does not match
/// its expected shape is treated as absent rather than erroring, matching
/// the tolerance the done-flag policy requires.
pub fn build(key: TodoKey, properties: &Map<String, Value>) -> Todo {
    Todo {
        key,
        title: properties
            .get(TITLE_PROPERTY)
            .and_then(|value| value.as_str())
            .map(str::to_string),
        done: properties
            .get(DONE_PROPERTY)
            .and_then(|value| serde_json::from_value::<DoneValue>(value.clone()).ok()),
        order: properties
            .get(ORDER_PROPERTY)
            .and_then(|value| value.as_i64()),
    }
}

/// Encodes a typed record back into a property bag for persistence.
///
/// Absent fields are omitted entirely; present done flags keep their wire
/// encoding (integer or boolean) unchanged.
pub fn to_properties(todo: &Todo) -> Map<String, Value> {
    let mut properties = Map::new();

    if let Some(title) = &todo.title {
        properties.insert(TITLE_PROPERTY.to_string(), Value::from(title.clone()));
    }
    if let Some(done) = todo.done {
        let encoded = match done {
            DoneValue::Flag(value) => Value::from(value),
            DoneValue::Bool(value) => Value::from(value),
        };
        properties.insert(DONE_PROPERTY.to_string(), encoded);
    }
    if let Some(order) = todo.order {
        properties.insert(ORDER_PROPERTY.to_string(), Value::from(order));
    }

    properties
}

#[cfg(test)]
mod tests {
    use super::{build, to_properties, DONE_PROPERTY, ORDER_PROPERTY, TITLE_PROPERTY};
    use crate::model::todo::{DoneValue, Todo};
    use serde_json::{json, Map, Value};
    use uuid::Uuid;

    fn bag(entries: &[(&str, Value)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn build_decodes_both_done_encodings() {
        let key = Uuid::new_v4();

        let flagged = build(key, &bag(&[(DONE_PROPERTY, json!(1))]));
        assert_eq!(flagged.done, Some(DoneValue::Flag(1)));
        assert!(flagged.is_done());

        let boolean = build(key, &bag(&[(DONE_PROPERTY, json!(true))]));
        assert_eq!(boolean.done, Some(DoneValue::Bool(true)));
        assert!(boolean.is_done());
    }

    #[test]
    fn build_treats_unrecognized_shapes_as_absent() {
        let key = Uuid::new_v4();
        let todo = build(
            key,
            &bag(&[
                (DONE_PROPERTY, json!("true")),
                (TITLE_PROPERTY, json!(42)),
                (ORDER_PROPERTY, json!("third")),
            ]),
        );

        assert_eq!(todo.done, None);
        assert!(!todo.is_done());
        assert_eq!(todo.title, None);
        assert_eq!(todo.title(), "");
        assert_eq!(todo.order, None);
    }

    #[test]
    fn round_trip_preserves_wire_encoding() {
        let key = Uuid::new_v4();
        let original = bag(&[
            (DONE_PROPERTY, json!(true)),
            (TITLE_PROPERTY, json!("Buy milk")),
            (ORDER_PROPERTY, json!(3)),
        ]);

        let todo = build(key, &original);
        assert_eq!(to_properties(&todo), original);
    }

    #[test]
    fn to_properties_omits_absent_fields() {
        let todo = Todo {
            key: Uuid::new_v4(),
            title: None,
            done: None,
            order: None,
        };
        assert!(to_properties(&todo).is_empty());
    }
}
