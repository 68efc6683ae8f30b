//! Domain model for chat-derived tasks.
//!
//! # Responsibility
//! - Define canonical data structures used by the classification and
//!   assignment engine.
//!
//! # Invariants
//! - Every task and message is identified by a stable UUID.
//! - Assignees are never decided at classification time.

pub mod classification;
pub mod message;
pub mod task;
