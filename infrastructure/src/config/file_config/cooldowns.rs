//! Rate-limit windows from TOML (`[cooldowns]` section)
//!
//! ```toml
//! [cooldowns]
//! propose_seconds = 60
//! interaction_seconds = 600
//! verification_resubmit_seconds = 3600
//! ```

use denkeeper_application::CooldownPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCooldownsConfig {
    pub propose_seconds: u64,
    /// Per verb, verified members only
    pub interaction_seconds: u64,
    pub verification_resubmit_seconds: u64,
}

impl Default for FileCooldownsConfig {
    fn default() -> Self {
        Self {
            propose_seconds: 60,
            interaction_seconds: 600,
            verification_resubmit_seconds: 3600,
        }
    }
}

impl FileCooldownsConfig {
    pub fn to_cooldown_policy(&self) -> CooldownPolicy {
        CooldownPolicy::default()
            .with_propose(Duration::from_secs(self.propose_seconds))
            .with_interaction(Duration::from_secs(self.interaction_seconds))
            .with_verification_resubmit(Duration::from_secs(self.verification_resubmit_seconds))
    }
}
