//! Authorization adapters
//!
//! [`RoleDirectory`] answers capability questions from a capability → role
//! mapping and an in-process record of which roles each member holds.

mod role_directory;

pub use role_directory::RoleDirectory;
