//! Infrastructure layer for denkeeper
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod authorization;
pub mod config;
pub mod logging;
pub mod persistence;

// Re-export commonly used types
pub use authorization::RoleDirectory;
pub use config::{
    ConfigLoader, ConfigValidationError, FileChannelsConfig, FileConfig, FileCooldownsConfig,
    FileLevelingConfig, FileLimitsConfig, FileLoggingConfig, FileQuestionnairesConfig,
    FileRolesConfig, FileTimeoutsConfig,
};
pub use logging::JsonlAuditLog;
pub use persistence::{InMemoryRelationshipStore, InMemorySubmissionStore};
