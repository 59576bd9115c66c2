//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate bucket calls into the user intents a front end forwards.
//! - Keep presentation layers decoupled from storage and query details.

pub mod todo_service;
