//! Gate timeouts and limits from TOML (`[timeouts]` and `[limits]` sections)
//!
//! Example configuration:
//!
//! ```toml
//! [timeouts]
//! response_seconds = 60
//! confirmation_seconds = 30
//! divorce_seconds = 60
//! escape_seconds = 30
//! answer_seconds = 300
//! sweep_seconds = 30
//!
//! [limits]
//! max_pets = 2
//! ```

use denkeeper_application::WorkflowParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTimeoutsConfig {
    /// Counterparty response to a marriage or collar proposal
    pub response_seconds: u64,
    /// Initiator confirmation of an accepted marriage
    pub confirmation_seconds: u64,
    pub divorce_seconds: u64,
    pub escape_seconds: u64,
    /// Each questionnaire answer over DM
    pub answer_seconds: u64,
    /// Interval of the overdue-proposal sweeper
    pub sweep_seconds: u64,
}

impl Default for FileTimeoutsConfig {
    fn default() -> Self {
        Self {
            response_seconds: 60,
            confirmation_seconds: 30,
            divorce_seconds: 60,
            escape_seconds: 30,
            answer_seconds: 300,
            sweep_seconds: 30,
        }
    }
}

impl FileTimeoutsConfig {
    /// Names of fields set to zero.
    pub fn zero_fields(&self) -> Vec<&'static str> {
        [
            ("response_seconds", self.response_seconds),
            ("confirmation_seconds", self.confirmation_seconds),
            ("divorce_seconds", self.divorce_seconds),
            ("escape_seconds", self.escape_seconds),
            ("answer_seconds", self.answer_seconds),
            ("sweep_seconds", self.sweep_seconds),
        ]
        .into_iter()
        .filter(|(_, value)| *value == 0)
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLimitsConfig {
    /// Maximum pets one owner may collar
    pub max_pets: usize,
}

impl Default for FileLimitsConfig {
    fn default() -> Self {
        Self { max_pets: 2 }
    }
}

/// Combine `[timeouts]` and `[limits]` into [`WorkflowParams`].
pub fn to_workflow_params(timeouts: &FileTimeoutsConfig, limits: &FileLimitsConfig) -> WorkflowParams {
    WorkflowParams::default()
        .with_response_timeout(Duration::from_secs(timeouts.response_seconds))
        .with_confirmation_timeout(Duration::from_secs(timeouts.confirmation_seconds))
        .with_divorce_timeout(Duration::from_secs(timeouts.divorce_seconds))
        .with_escape_timeout(Duration::from_secs(timeouts.escape_seconds))
        .with_answer_timeout(Duration::from_secs(timeouts.answer_seconds))
        .with_sweep_interval(Duration::from_secs(timeouts.sweep_seconds))
        .with_max_pets(limits.max_pets)
}
