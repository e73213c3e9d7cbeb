//! One-shot social interactions.

use super::{WorkflowCoordinator, WorkflowError};
use crate::cooldown::CooldownAction;
use crate::ports::notification::{Notice, Target};
use denkeeper_domain::{Capability, ChannelId, InteractionVerb, MessageId, UserId};
use tokio::time::Instant;
use tracing::debug;

impl WorkflowCoordinator {
    /// Announce `actor` performing `verb` on `target`.
    ///
    /// Verified members are rate limited per verb.
    pub async fn interact(
        &self,
        actor: UserId,
        target: UserId,
        verb: InteractionVerb,
        channel: ChannelId,
    ) -> Result<MessageId, WorkflowError> {
        if actor == target {
            return Err(WorkflowError::Invalid(format!("you can't {} yourself", verb)));
        }

        let action = CooldownAction::Interaction(verb);
        let rate_limited = self.authorizer.has_capability(actor, Capability::Verified);
        if rate_limited {
            let remaining = self.cooldowns.check(actor, action);
            if !remaining.is_zero() {
                return Err(WorkflowError::OnCooldown { action, remaining });
            }
        }

        let message = self
            .notifier
            .deliver(
                Target::Channel(channel),
                Notice::InteractionPerformed {
                    verb,
                    actor,
                    target,
                },
            )
            .await?;

        if rate_limited {
            self.cooldowns.record(actor, action, Instant::now());
        }
        debug!("{} used {} on {}", actor, verb, target);
        Ok(message)
    }
}
