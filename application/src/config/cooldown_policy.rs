//! Rate-limit windows per action.

use crate::cooldown::CooldownAction;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooldownPolicy {
    /// Between two proposals by the same initiator.
    pub propose: Duration,
    /// Between two uses of the same interaction verb by a verified member.
    pub interaction: Duration,
    /// Between two verification submissions.
    pub verification_resubmit: Duration,
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            propose: Duration::from_secs(60),
            interaction: Duration::from_secs(600),
            verification_resubmit: Duration::from_secs(3600),
        }
    }
}

impl CooldownPolicy {
    pub fn window(&self, action: CooldownAction) -> Duration {
        match action {
            CooldownAction::Propose => self.propose,
            CooldownAction::Interaction(_) => self.interaction,
            CooldownAction::VerificationResubmit => self.verification_resubmit,
        }
    }

    pub fn with_propose(mut self, window: Duration) -> Self {
        self.propose = window;
        self
    }

    pub fn with_interaction(mut self, window: Duration) -> Self {
        self.interaction = window;
        self
    }

    pub fn with_verification_resubmit(mut self, window: Duration) -> Self {
        self.verification_resubmit = window;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use denkeeper_domain::InteractionVerb;

    #[test]
    fn test_window_per_action() {
        let policy = CooldownPolicy::default();
        assert_eq!(policy.window(CooldownAction::Propose), Duration::from_secs(60));
        assert_eq!(
            policy.window(CooldownAction::Interaction(InteractionVerb::Hug)),
            Duration::from_secs(600)
        );
        assert_eq!(
            policy.window(CooldownAction::VerificationResubmit),
            Duration::from_secs(3600)
        );
    }
}
