//! To-do use-case service.
//!
//! # Responsibility
//! - Provide the user intents a front end forwards: add, toggle, rename,
//!   reorder, count completed, list all, clear completed.
//! - Delegate all persistence to the bucket contract.
//!
//! # Invariants
//! - Every mutation round-trips through bucket `get`/`save`; the service
//!   holds no record state of its own.
//! - `count_completed` and `delete_completed` use the store's equality
//!   filter against the encoded done value, not the record-level decode
//!   fallback. The two can disagree for exotic encodings; the store filter
//!   is authoritative for both so count and clear always agree with each
//!   other.

use crate::model::schema;
use crate::model::todo::{Todo, TodoKey, DONE};
use crate::store::bucket::{ObjectBucket, StoreResult};
use crate::store::query::{ObjectCursor, ObjectQuery};
use log::{info, warn};

/// Query matching records whose encoded done value equals [`DONE`].
///
/// Under the SQLite store this also matches boolean `true` (extracted as
/// integer 1); integers other than 1 and non-scalar encodings do not match.
pub fn completed_query() -> ObjectQuery {
    ObjectQuery::new().where_equals(schema::DONE_PROPERTY, DONE)
}

/// Query for every record, ascending by sort position.
pub fn all_ordered_query() -> ObjectQuery {
    ObjectQuery::new().order_by(schema::ORDER_PROPERTY)
}

/// Use-case service wrapper over a bucket implementation.
pub struct TodoService<B> {
    bucket: B,
}

impl<B: ObjectBucket + Clone + 'static> TodoService<B> {
    /// Creates a service borrowing no global state: the bucket is injected
    /// once at construction and shared by reference-counted clone.
    pub fn new(bucket: B) -> Self {
        Self { bucket }
    }

    pub fn bucket(&self) -> &B {
        &self.bucket
    }

    /// Creates a new record appended at the end of the list.
    ///
    /// The sort position is the current total record count, so duplicate
    /// positions can appear after deletions; the store tolerates that.
    pub fn add_todo(&self, title: impl Into<String>) -> StoreResult<Todo> {
        let mut todo = self.bucket.new_object();
        todo.set_title(title);
        let position = self.bucket.count(&ObjectQuery::new())?;
        todo.set_order(position as i64);
        self.bucket.save(&todo)?;

        info!(
            "event=todo_add module=service status=ok key={} order={}",
            todo.key,
            todo.order.unwrap_or_default()
        );
        Ok(todo)
    }

    /// Flips the completed state of one record and persists it.
    pub fn toggle_done(&self, key: &TodoKey) -> StoreResult<Todo> {
        let mut todo = self.bucket.get(key)?;
        todo.toggle_done();
        self.bucket.save(&todo)?;
        Ok(todo)
    }

    /// Replaces the title of one record and persists it.
    pub fn rename(&self, key: &TodoKey, title: impl Into<String>) -> StoreResult<Todo> {
        let mut todo = self.bucket.get(key)?;
        todo.set_title(title);
        self.bucket.save(&todo)?;
        Ok(todo)
    }

    /// Replaces the sort position of one record and persists it.
    pub fn set_order(&self, key: &TodoKey, order: i64) -> StoreResult<Todo> {
        let mut todo = self.bucket.get(key)?;
        todo.set_order(order);
        self.bucket.save(&todo)?;
        Ok(todo)
    }

    /// Counts completed records using the store's filter semantics.
    pub fn count_completed(&self) -> StoreResult<u64> {
        self.bucket.count(&completed_query())
    }

    /// Returns all records ascending by sort position.
    pub fn query_all(&self) -> StoreResult<ObjectCursor> {
        self.bucket.find(&all_ordered_query())
    }

    /// Deletes every completed record on a background thread.
    ///
    /// Returns immediately; completion is observed only through the
    /// bucket's delete notifications. Failures on individual records are
    /// logged and the remaining records are still attempted. There is no
    /// retry once dispatched.
    pub fn delete_completed(&self) {
        let bucket = self.bucket.clone();
        self.bucket.execute_async(Box::new(move || {
            let cursor = match bucket.find(&completed_query()) {
                Ok(cursor) => cursor,
                Err(err) => {
                    warn!("event=clear_completed module=service status=error error={err}");
                    return;
                }
            };

            for todo in cursor {
                if let Err(err) = bucket.delete(&todo) {
                    warn!(
                        "event=clear_completed module=service status=error key={} error={err}",
                        todo.key
                    );
                }
            }
        }));
    }
}
