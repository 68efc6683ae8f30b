//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate classification and repository calls into use-case APIs.
//! - Keep transport and UI layers decoupled from storage details.

pub mod assignment;
pub mod board;
pub mod dispatch;
pub mod reply;
