//! Workflow configuration container.
//!
//! [`WorkflowConfig`] groups the split configuration types into a single
//! container handed to the [`WorkflowCoordinator`](crate::WorkflowCoordinator).
//!
//! | Type | Proposals | Submissions | Interactions | Leveling |
//! |------|-----------|-------------|--------------|----------|
//! | `WorkflowParams` | Yes | Yes (answer timeout) | No | No |
//! | `CooldownPolicy` | Yes | Yes | Yes | No |
//! | `ChannelMap` | Yes | Yes | Yes | Yes |
//! | `Questionnaires` | No | Yes | No | No |
//! | `LevelLadder` | No | No | No | Yes |
//!
//! All parts are set at initialization and remain static.

use super::{ChannelMap, CooldownPolicy, Questionnaires, WorkflowParams};
use denkeeper_domain::LevelLadder;

#[derive(Debug, Clone, Default)]
pub struct WorkflowConfig {
    params: WorkflowParams,
    cooldowns: CooldownPolicy,
    channels: ChannelMap,
    questionnaires: Questionnaires,
    ladder: LevelLadder,
}

impl WorkflowConfig {
    pub fn new(
        params: WorkflowParams,
        cooldowns: CooldownPolicy,
        channels: ChannelMap,
        questionnaires: Questionnaires,
        ladder: LevelLadder,
    ) -> Self {
        Self {
            params,
            cooldowns,
            channels,
            questionnaires,
            ladder,
        }
    }

    // ==================== Accessors ====================

    pub fn params(&self) -> &WorkflowParams {
        &self.params
    }

    pub fn cooldowns(&self) -> &CooldownPolicy {
        &self.cooldowns
    }

    pub fn channels(&self) -> &ChannelMap {
        &self.channels
    }

    pub fn questionnaires(&self) -> &Questionnaires {
        &self.questionnaires
    }

    pub fn ladder(&self) -> &LevelLadder {
        &self.ladder
    }

    // ==================== Builder Methods ====================

    pub fn with_params(mut self, params: WorkflowParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_cooldowns(mut self, cooldowns: CooldownPolicy) -> Self {
        self.cooldowns = cooldowns;
        self
    }

    pub fn with_channels(mut self, channels: ChannelMap) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_questionnaires(mut self, questionnaires: Questionnaires) -> Self {
        self.questionnaires = questionnaires;
        self
    }

    pub fn with_ladder(mut self, ladder: LevelLadder) -> Self {
        self.ladder = ladder;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_parts() {
        let config = WorkflowConfig::default();
        assert_eq!(config.params().max_pets, 2);
        assert_eq!(config.cooldowns().propose, Duration::from_secs(60));
        assert!(config.ladder().is_empty());
    }

    #[test]
    fn test_builder_replaces_part() {
        let config = WorkflowConfig::default()
            .with_params(WorkflowParams::default().with_max_pets(5));
        assert_eq!(config.params().max_pets, 5);
    }
}
