//! Bucket change notification contract.
//!
//! # Responsibility
//! - Define the callbacks a consumer can register for local saves/deletes
//!   and for changes arriving from the sync transport.
//!
//! # Invariants
//! - Registration is explicit and lifecycle-owned: subscribe on start,
//!   unsubscribe with the returned [`ListenerId`] on stop. The bucket keeps
//!   a strong handle until deregistration.
//! - Callbacks may arrive on any thread; implementations must not assume a
//!   foreground context.

use crate::model::todo::{Todo, TodoKey};

/// Kind of change applied by the sync transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Insert,
    Modify,
    Remove,
}

/// Handle identifying one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Observer for bucket changes. All methods default to no-ops so consumers
/// implement only the events they care about.
pub trait BucketListener: Send + Sync {
    /// Called after a record was saved locally.
    fn on_save_object(&self, _todo: &Todo) {}

    /// Called after a record was deleted locally.
    fn on_delete_object(&self, _todo: &Todo) {}

    /// Called before a change from the sync transport is applied.
    fn on_before_network_update(&self, _key: &TodoKey) {}

    /// Called after a change from the sync transport was applied.
    fn on_network_change(&self, _change: ChangeType, _key: &TodoKey) {}
}
