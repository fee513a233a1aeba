//! AWS-oriented adapters and handlers for the LMS identity layer.
//!
//! This crate owns runtime integration details (Lambda handlers, logging, and
//! key-value store adapters) and re-exports the domain contract crate.

pub mod adapters;
pub mod handlers;
pub mod logging;

pub use lms_identity_core as runtime;
