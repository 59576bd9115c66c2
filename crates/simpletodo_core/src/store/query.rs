//! Query builder and result cursor for bucket reads.
//!
//! # Responsibility
//! - Express equality filters on named properties and ascending ordering
//!   without leaking SQL to callers.
//!
//! # Invariants
//! - Filter values compare with the store's own semantics against the
//!   encoded property value, not with the model's decode fallback.

use crate::model::todo::Todo;
use serde_json::Value;

/// Declarative bucket query: AND-ed equality filters plus optional
/// ascending order on one property.
#[derive(Debug, Clone, Default)]
pub struct ObjectQuery {
    filters: Vec<(String, Value)>,
    order_by: Option<String>,
}

impl ObjectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter on a named top-level property.
    pub fn where_equals(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((property.into(), value.into()));
        self
    }

    /// Orders results ascending by a named top-level property.
    ///
    /// Records missing the property sort first; equal values tie-break by
    /// ascending key so results stay deterministic.
    pub fn order_by(mut self, property: impl Into<String>) -> Self {
        self.order_by = Some(property.into());
        self
    }

    pub(crate) fn filters(&self) -> &[(String, Value)] {
        &self.filters
    }

    pub(crate) fn order_property(&self) -> Option<&str> {
        self.order_by.as_deref()
    }
}

/// Iterable cursor over records matched by a query.
///
/// Results are materialized at execution time; the cursor does not observe
/// writes made after `find` returned.
#[derive(Debug)]
pub struct ObjectCursor {
    records: std::vec::IntoIter<Todo>,
}

impl ObjectCursor {
    pub(crate) fn new(records: Vec<Todo>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl Iterator for ObjectCursor {
    type Item = Todo;

    fn next(&mut self) -> Option<Todo> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for ObjectCursor {}
