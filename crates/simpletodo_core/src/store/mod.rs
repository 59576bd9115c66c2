//! Synced object store contract and its SQLite-backed implementation.
//!
//! # Responsibility
//! - Define the bucket contract the model layer depends on: keyed CRUD,
//!   filtered/ordered queries, change listeners and off-thread work.
//! - Keep SQL and JSON property-bag details inside the store boundary.
//!
//! # Invariants
//! - All mutable record state lives in the bucket; callers hold no copy that
//!   survives a save round-trip.
//! - Listener callbacks run on the mutating caller's thread, which for async
//!   work is a background thread. Consumers marshal to their own context.

pub mod bucket;
pub mod listener;
pub mod query;
