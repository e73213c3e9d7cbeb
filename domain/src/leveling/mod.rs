//! Level-role rewards.
//!
//! A [`LevelLadder`] maps a member's level to the set of reward roles they
//! should hold. Cumulative rewards stay once earned; rank rewards replace
//! each other so only the highest reached rank is held. Reconciling that
//! target against the roles a member actually has is a pure diff
//! ([`RoleDiff::between`]); applying it is the caller's job.

use crate::core::ids::RoleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelReward {
    pub level: u32,
    pub role: RoleId,
    pub name: String,
    /// Kept at every higher level instead of being replaced by the next rank.
    #[serde(default)]
    pub cumulative: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLadder {
    rewards: Vec<LevelReward>,
}

impl LevelLadder {
    pub fn new(mut rewards: Vec<LevelReward>) -> Self {
        rewards.sort_by_key(|r| r.level);
        Self { rewards }
    }

    pub fn rewards(&self) -> &[LevelReward] {
        &self.rewards
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Every role the ladder controls.
    pub fn managed_roles(&self) -> BTreeSet<RoleId> {
        self.rewards.iter().map(|r| r.role).collect()
    }

    /// Roles a member at `level` should hold.
    pub fn target_roles(&self, level: u32) -> BTreeSet<RoleId> {
        let reached = self.rewards.iter().filter(|r| r.level <= level);

        let mut roles: BTreeSet<RoleId> = reached
            .clone()
            .filter(|r| r.cumulative)
            .map(|r| r.role)
            .collect();

        if let Some(rank) = reached.filter(|r| !r.cumulative).last() {
            roles.insert(rank.role);
        }
        roles
    }

    pub fn reward_for(&self, role: RoleId) -> Option<&LevelReward> {
        self.rewards.iter().find(|r| r.role == role)
    }
}

/// Grants and revocations that bring a member's roles to a target set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDiff {
    pub grant: Vec<RoleId>,
    pub revoke: Vec<RoleId>,
}

impl RoleDiff {
    /// Diff `current` against `target`, touching only `managed` roles.
    pub fn between(
        current: &BTreeSet<RoleId>,
        target: &BTreeSet<RoleId>,
        managed: &BTreeSet<RoleId>,
    ) -> Self {
        let grant = target
            .iter()
            .filter(|r| managed.contains(r) && !current.contains(r))
            .copied()
            .collect();
        let revoke = current
            .iter()
            .filter(|r| managed.contains(r) && !target.contains(r))
            .copied()
            .collect();
        Self { grant, revoke }
    }

    pub fn is_empty(&self) -> bool {
        self.grant.is_empty() && self.revoke.is_empty()
    }
}
