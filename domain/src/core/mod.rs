//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: platform and registry identifiers
//! - [`capability::Capability`]: what a member is allowed to do
//! - [`error::DomainError`]: domain-level errors

pub mod capability;
pub mod error;
pub mod ids;
