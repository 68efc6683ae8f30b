//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contracts the engine consumes (tasks, message log).
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce model validation before persistence.
//! - Conditional writes report "no row changed" as `Ok(false)`; callers decide
//!   whether that means not-found or a refused transition.

pub mod message_repo;
pub mod task_repo;
