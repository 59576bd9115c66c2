//! Domain model for synced to-do records.
//!
//! # Responsibility
//! - Define the typed `Todo` record and its stable key.
//! - Own the done-flag compatibility decoding shared by every caller.
//!
//! # Invariants
//! - Every record is identified by a stable `TodoKey` assigned by the store.
//! - The model holds no store handle; all persistence round-trips through the
//!   bucket layer.

pub mod schema;
pub mod todo;
