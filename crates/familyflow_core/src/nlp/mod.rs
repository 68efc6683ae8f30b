//! Linguistic fast path.
//!
//! `token` defines the narrow parser capability; `extractor` holds the
//! command-recognition rules built on it.

pub mod extractor;
pub mod token;
