//! Core domain logic for a synced to-do list.
//! This crate is the single source of truth for the done-flag compatibility
//! policy and the bucket contract front ends consume.

pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::schema::{BUCKET_NAME, DONE_PROPERTY, ORDER_PROPERTY, TITLE_PROPERTY};
pub use model::todo::{DoneValue, Todo, TodoKey, DONE, NOT_DONE};
pub use service::todo_service::{all_ordered_query, completed_query, TodoService};
pub use store::bucket::{ObjectBucket, RemoteChange, SqliteBucket, StoreError, StoreResult};
pub use store::listener::{BucketListener, ChangeType, ListenerId};
pub use store::query::{ObjectCursor, ObjectQuery};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
