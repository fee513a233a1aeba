//! Shared identity-layer domain primitives.
//!
//! This crate owns the provisioning and tenant-lookup contracts, record shapes,
//! error taxonomy, and table configuration. It intentionally excludes AWS SDK
//! and Lambda runtime concerns.

pub mod config;
pub mod contract;
pub mod error;
