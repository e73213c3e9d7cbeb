//! Workflow coordinator
//!
//! Drives every reaction-gated lifecycle from request to cleanup by
//! composing the registries, gates and cooldowns with the external ports.
//!
//! | Flow | Entry point | Gate | Commits |
//! |------|-------------|------|---------|
//! | Marriage / collar | [`propose`](WorkflowCoordinator::propose) | counterparty reaction (+ initiator confirmation) | relationship created |
//! | Divorce / escape | [`dissolve`](WorkflowCoordinator::dissolve) | initiator reaction | relationship deleted |
//! | Verification / profile / image | [`begin_submission`](WorkflowCoordinator::begin_submission) | DM replies, then a moderator reaction | capability granted or record saved |
//! | Interactions | [`interact`](WorkflowCoordinator::interact) | none | announcement |
//!
//! Persistence and notification side effects run only on the path that won
//! the entity's resolve step, and never while a registry lock is held.

mod dissolution;
mod interaction;
mod proposal;
mod review;
mod submission;
mod types;

#[cfg(test)]
mod tests;

pub use types::{IntakeOutcome, ReviewOutcome, WorkflowError, WorkflowOutcome};

use crate::config::WorkflowConfig;
use crate::cooldown::CooldownTracker;
use crate::gate::{ReactionGate, ReplyGate};
use crate::ports::audit_log::{AuditEntry, AuditLog, NoAuditLog};
use crate::ports::authorization::Authorizer;
use crate::ports::notification::{Notice, Notifier, Target};
use crate::ports::persistence::{RelationshipStore, SubmissionStore};
use crate::registry::{ApprovalQueue, ProposalRegistry};
use crate::use_cases::sync_level_roles::{SyncLevelRolesError, SyncLevelRolesUseCase};
use chrono::Utc;
use denkeeper_domain::{
    EligibilityFacts, ExclusivityDomain, Proposal, ProposalKind, ReactionEvent, ReplyEvent,
    RoleDiff, UserId, proposal::eligibility,
};
use denkeeper_domain::{Capability, Ineligibility, MessageId};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Orchestrates proposal, dissolution, submission and interaction flows.
pub struct WorkflowCoordinator {
    pub(super) config: WorkflowConfig,
    pub(super) proposals: ProposalRegistry,
    pub(super) submissions: ApprovalQueue,
    pub(super) cooldowns: CooldownTracker,
    pub(super) reactions: ReactionGate,
    pub(super) replies: ReplyGate,
    pub(super) relationships: Arc<dyn RelationshipStore>,
    pub(super) records: Arc<dyn SubmissionStore>,
    pub(super) notifier: Arc<dyn Notifier>,
    pub(super) authorizer: Arc<dyn Authorizer>,
    pub(super) audit: Arc<dyn AuditLog>,
    pub(super) shutdown: CancellationToken,
}

impl WorkflowCoordinator {
    pub fn new(
        config: WorkflowConfig,
        relationships: Arc<dyn RelationshipStore>,
        records: Arc<dyn SubmissionStore>,
        notifier: Arc<dyn Notifier>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        Self {
            proposals: ProposalRegistry::new(config.params().clone()).with_shutdown(shutdown.clone()),
            submissions: ApprovalQueue::new(),
            cooldowns: CooldownTracker::new(config.cooldowns().clone()),
            reactions: ReactionGate::new(),
            replies: ReplyGate::new(),
            config,
            relationships,
            records,
            notifier,
            authorizer,
            audit: Arc::new(NoAuditLog),
            shutdown,
        }
    }

    /// Create with an audit log.
    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn proposals(&self) -> &ProposalRegistry {
        &self.proposals
    }

    pub fn submissions(&self) -> &ApprovalQueue {
        &self.submissions
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    pub fn reaction_gate(&self) -> &ReactionGate {
        &self.reactions
    }

    pub fn reply_gate(&self) -> &ReplyGate {
        &self.replies
    }

    // ==================== Event Routing ====================

    /// Route an inbound reaction.
    ///
    /// Open gates get the first look; a reaction no gate took is treated as
    /// a possible reviewer decision.
    pub async fn handle_reaction(&self, event: ReactionEvent) -> Option<ReviewOutcome> {
        if self.reactions.dispatch(event.clone()) {
            debug!("Reaction on {} consumed by a gate", event.message);
            return None;
        }
        match self.review_by_reaction(event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                info!("Review reaction rejected: {}", e);
                None
            }
        }
    }

    /// Route an inbound direct message. Returns `true` if a workflow took it.
    pub fn handle_reply(&self, reply: ReplyEvent) -> bool {
        self.replies.dispatch(reply)
    }

    /// Cancel the caller's own pending proposal in `domain`.
    ///
    /// The gate bound to it is torn down and its workflow ends as
    /// [`WorkflowOutcome::Superseded`] without notifying anyone.
    pub fn withdraw(&self, user: UserId, domain: ExclusivityDomain) -> Result<Proposal, WorkflowError> {
        Ok(self.proposals.withdraw(user, domain)?)
    }

    /// Reconcile a member's level-reward roles with their level.
    pub async fn sync_level_roles(&self, member: UserId, level: u32) -> Result<RoleDiff, SyncLevelRolesError> {
        SyncLevelRolesUseCase::new(
            Arc::clone(&self.authorizer),
            Arc::clone(&self.notifier),
            self.config.ladder().clone(),
        )
        .with_announce_channel(self.config.channels().level_up)
        .with_audit_log(Arc::clone(&self.audit))
        .execute(member, level)
        .await
    }

    // ==================== Supervision ====================

    /// Run a workflow on its own task under a supervising task.
    ///
    /// A panic inside the workflow is caught at the supervisor, logged, and
    /// reported as `None`; RAII tickets and drafts release the workflow's
    /// locks while it unwinds.
    pub fn spawn_workflow<F, T>(label: impl Into<String>, workflow: F) -> JoinHandle<Option<T>>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let label = label.into();
        let inner = tokio::spawn(workflow);
        tokio::spawn(async move {
            match inner.await {
                Ok(output) => Some(output),
                Err(e) if e.is_panic() => {
                    error!("Workflow '{}' panicked: {}", label, e);
                    None
                }
                Err(e) => {
                    warn!("Workflow '{}' was aborted: {}", label, e);
                    None
                }
            }
        })
    }

    /// Periodically time out overdue proposals and forget ended cooldowns.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.config.params().sweep_interval);
            loop {
                tokio::select! {
                    biased;
                    _ = this.shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        this.sweep();
                    }
                }
            }
            debug!("Sweeper stopped");
        })
    }

    /// One sweeper pass.
    pub fn sweep(&self) {
        for proposal in self.proposals.sweep_expired(Utc::now()) {
            info!("Swept overdue {} {}", proposal.kind, proposal.id);
        }
        let purged = self.cooldowns.purge_expired(tokio::time::Instant::now());
        if purged > 0 {
            debug!("Purged {} ended cooldowns", purged);
        }
    }

    /// Tear down every open gate and stop the sweeper.
    pub fn shutdown(&self) {
        info!("Workflow coordinator shutting down");
        self.shutdown.cancel();
    }

    // ==================== Shared Helpers ====================

    /// Evaluate eligibility for `kind` against fresh capability and
    /// relationship data.
    pub(super) async fn eligibility(
        &self,
        kind: ProposalKind,
        initiator: UserId,
        counterparty: UserId,
    ) -> Result<Result<(), Ineligibility>, WorkflowError> {
        let initiator_relationships = self.relationships.relationships_of(initiator).await?;
        let counterparty_relationships = if counterparty == initiator {
            initiator_relationships.clone()
        } else {
            self.relationships.relationships_of(counterparty).await?
        };

        let facts = EligibilityFacts {
            initiator,
            counterparty,
            initiator_adult: self.authorizer.has_capability(initiator, Capability::Adult),
            counterparty_adult: self.authorizer.has_capability(counterparty, Capability::Adult),
            initiator_relationships: &initiator_relationships,
            counterparty_relationships: &counterparty_relationships,
            max_pets: self.config.params().max_pets,
        };
        Ok(eligibility::check(kind, &facts))
    }

    /// Deliver a notice whose loss does not affect the workflow's outcome.
    pub(super) async fn announce(&self, target: Target, notice: Notice) -> Option<MessageId> {
        match self.notifier.deliver(target, notice).await {
            Ok(message) => Some(message),
            Err(e) => {
                warn!("Notice to {} not delivered: {}", target, e);
                None
            }
        }
    }

    pub(super) async fn retract(&self, target: Target, message: MessageId) {
        if let Err(e) = self.notifier.retract(target, message).await {
            warn!("Could not retract {} in {}: {}", message, target, e);
        }
    }

    pub(super) fn audit(&self, event_type: &'static str, payload: serde_json::Value) {
        self.audit.record(AuditEntry::new(event_type, payload));
    }
}
