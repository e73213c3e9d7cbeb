//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application types
//! with [`FileConfig::to_workflow_config`].

mod channels;
mod cooldowns;
mod leveling;
mod logging;
mod questionnaires;
mod roles;
mod timeouts;

pub use channels::FileChannelsConfig;
pub use cooldowns::FileCooldownsConfig;
pub use leveling::FileLevelingConfig;
pub use logging::FileLoggingConfig;
pub use questionnaires::FileQuestionnairesConfig;
pub use roles::FileRolesConfig;
pub use timeouts::{FileLimitsConfig, FileTimeoutsConfig, to_workflow_params};

use denkeeper_application::WorkflowConfig;
use denkeeper_domain::Capability;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("{section}.{field} cannot be 0")]
    ZeroValue {
        section: &'static str,
        field: &'static str,
    },

    #[error("leveling.rewards has more than one reward at level {0}")]
    DuplicateRewardLevel(u32),

    #[error("questionnaires.{0} has no questions")]
    EmptyQuestionnaire(&'static str),

    #[error("roles.{0} is not set; nobody will hold that capability")]
    UnmappedCapability(Capability),
}

impl ConfigValidationError {
    /// Whether the bot can still run with this issue.
    pub fn is_warning(&self) -> bool {
        matches!(self, ConfigValidationError::UnmappedCapability(_))
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Gate timeouts
    pub timeouts: FileTimeoutsConfig,
    /// Rate-limit windows
    pub cooldowns: FileCooldownsConfig,
    /// Capacity limits
    pub limits: FileLimitsConfig,
    /// Platform roles backing each capability
    pub roles: FileRolesConfig,
    /// Where notices are posted
    pub channels: FileChannelsConfig,
    /// DM questions per submission kind
    pub questionnaires: FileQuestionnairesConfig,
    /// Level-role rewards
    pub leveling: FileLevelingConfig,
    /// Operation and audit log destinations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues: Vec<ConfigValidationError> = self
            .timeouts
            .zero_fields()
            .into_iter()
            .map(|field| ConfigValidationError::ZeroValue {
                section: "timeouts",
                field,
            })
            .collect();

        if self.limits.max_pets == 0 {
            issues.push(ConfigValidationError::ZeroValue {
                section: "limits",
                field: "max_pets",
            });
        }

        issues.extend(
            self.leveling
                .duplicate_levels()
                .into_iter()
                .map(ConfigValidationError::DuplicateRewardLevel),
        );

        if self.questionnaires.verification.is_empty() {
            issues.push(ConfigValidationError::EmptyQuestionnaire("verification"));
        }
        if self.questionnaires.profile.is_empty() {
            issues.push(ConfigValidationError::EmptyQuestionnaire("profile"));
        }

        issues.extend(
            self.roles
                .unmapped()
                .into_iter()
                .map(ConfigValidationError::UnmappedCapability),
        );

        issues
    }

    /// Build the coordinator's configuration.
    pub fn to_workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig::new(
            to_workflow_params(&self.timeouts, &self.limits),
            self.cooldowns.to_cooldown_policy(),
            self.channels.to_channel_map(),
            self.questionnaires.to_questionnaires(),
            self.leveling.to_ladder(),
        )
    }
}
