//! Sync level roles use case
//!
//! Brings a member's reward roles in line with their level. The target set
//! comes from [`LevelLadder::target_roles`]; only roles the ladder manages
//! are granted or revoked, so moderator-assigned roles are never touched.
//!
//! Each newly granted reward is announced in the level-up channel when one
//! is configured.

use crate::ports::audit_log::{AuditEntry, AuditLog, NoAuditLog};
use crate::ports::authorization::{AuthorizationError, Authorizer};
use crate::ports::notification::{Notice, Notifier, Target};
use denkeeper_domain::{ChannelId, LevelLadder, RoleDiff, UserId};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while syncing level roles.
#[derive(Error, Debug)]
pub enum SyncLevelRolesError {
    /// Reading or changing the member's roles failed.
    ///
    /// Role changes applied before the failure are kept.
    #[error("Role sync failed: {0}")]
    Authorization(#[from] AuthorizationError),
}

/// Use case for reconciling level-reward roles.
pub struct SyncLevelRolesUseCase {
    authorizer: Arc<dyn Authorizer>,
    notifier: Arc<dyn Notifier>,
    ladder: LevelLadder,
    announce_channel: Option<ChannelId>,
    audit: Arc<dyn AuditLog>,
}

impl SyncLevelRolesUseCase {
    pub fn new(authorizer: Arc<dyn Authorizer>, notifier: Arc<dyn Notifier>, ladder: LevelLadder) -> Self {
        Self {
            authorizer,
            notifier,
            ladder,
            announce_channel: None,
            audit: Arc::new(NoAuditLog),
        }
    }

    /// Announce granted rewards in `channel`.
    pub fn with_announce_channel(mut self, channel: Option<ChannelId>) -> Self {
        self.announce_channel = channel;
        self
    }

    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    /// Apply the role diff for `member` at `level` and return it.
    pub async fn execute(&self, member: UserId, level: u32) -> Result<RoleDiff, SyncLevelRolesError> {
        if self.ladder.is_empty() {
            return Ok(RoleDiff::default());
        }

        let current = self.authorizer.roles_of(member).await?;
        let target = self.ladder.target_roles(level);
        let diff = RoleDiff::between(&current, &target, &self.ladder.managed_roles());

        if diff.is_empty() {
            debug!("{} already holds the rewards for level {}", member, level);
            return Ok(diff);
        }

        for role in &diff.revoke {
            self.authorizer.remove_role(member, *role).await?;
        }
        for role in &diff.grant {
            self.authorizer.add_role(member, *role).await?;
        }

        info!(
            "Synced level {} roles for {}: +{} -{}",
            level,
            member,
            diff.grant.len(),
            diff.revoke.len()
        );
        self.audit.record(AuditEntry::new(
            "level_roles_synced",
            json!({
                "member": member,
                "level": level,
                "granted": diff.grant,
                "revoked": diff.revoke,
            }),
        ));

        if let Some(channel) = self.announce_channel {
            for role in &diff.grant {
                let Some(reward) = self.ladder.reward_for(*role) else {
                    continue;
                };
                let notice = Notice::LevelRoleEarned {
                    member,
                    level: reward.level,
                    role_name: reward.name.clone(),
                };
                if let Err(e) = self.notifier.deliver(Target::Channel(channel), notice).await {
                    warn!("Level-up announcement for {} failed: {}", member, e);
                }
            }
        }

        Ok(diff)
    }
}
