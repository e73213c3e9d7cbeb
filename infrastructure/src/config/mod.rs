//! Configuration file loading for denkeeper
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables `DENKEEPER_<SECTION>__<FIELD>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./denkeeper.toml` or `./.denkeeper.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/denkeeper/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileChannelsConfig, FileConfig, FileCooldownsConfig, FileLevelingConfig,
    FileLimitsConfig, FileLoggingConfig, FileQuestionnairesConfig, FileRolesConfig,
    FileTimeoutsConfig,
};
pub use loader::ConfigLoader;
