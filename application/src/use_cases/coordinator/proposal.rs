//! Forming proposals: marriage (two-phase) and collar (single-phase).

use super::{WorkflowCoordinator, WorkflowError, WorkflowOutcome};
use crate::cooldown::CooldownAction;
use crate::gate::{GateOutcome, GateRequest};
use crate::ports::notification::{Notice, Target};
use crate::registry::ProposalTicket;
use denkeeper_domain::{ChannelId, ProposalKind, ProposalOutcome, ReactionSymbol, UserId};
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, info, warn};

impl WorkflowCoordinator {
    /// Ask `counterparty` to form a relationship with `initiator`.
    ///
    /// Dissolving kinds are handed to [`dissolve`](Self::dissolve), which
    /// ignores `counterparty`.
    ///
    /// Validation (cooldown, eligibility) and exclusivity conflicts are
    /// returned as errors before anything is posted. Everything after
    /// registration ends in a [`WorkflowOutcome`], except a failed save
    /// ([`WorkflowError::CommitFailed`]) and an unreachable channel.
    pub async fn propose(
        &self,
        initiator: UserId,
        counterparty: UserId,
        kind: ProposalKind,
        channel: ChannelId,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        if !kind.forms_relationship() {
            return self.dissolve(initiator, kind, channel).await;
        }

        let remaining = self.cooldowns.check(initiator, CooldownAction::Propose);
        if !remaining.is_zero() {
            return Err(WorkflowError::OnCooldown {
                action: CooldownAction::Propose,
                remaining,
            });
        }

        self.eligibility(kind, initiator, counterparty).await??;

        let ticket = self.proposals.register(initiator, counterparty, kind)?;
        self.cooldowns
            .record(initiator, CooldownAction::Propose, Instant::now());

        let target = Target::Channel(channel);
        let timeout = self.config.params().timeout_for(kind);
        let prompt = self
            .notifier
            .deliver(
                target,
                Notice::ProposalPrompt {
                    proposal: ticket.id(),
                    kind,
                    initiator,
                    counterparty,
                    timeout,
                },
            )
            .await?;

        let response = self
            .reactions
            .wait(
                GateRequest::new(prompt, timeout).from_user(counterparty),
                ticket.cancellation(),
            )
            .await;

        let outcome = match response {
            GateOutcome::Responded(r) if r.symbol == ReactionSymbol::Accept => {
                if kind.requires_confirmation() {
                    self.await_confirmation(&ticket, channel).await
                } else {
                    self.commit(&ticket, ProposalOutcome::Accepted, channel).await
                }
            }
            GateOutcome::Responded(_) => self.decline(&ticket, channel, false).await,
            GateOutcome::TimedOut => self.time_out(&ticket, channel).await,
            GateOutcome::Cancelled => self.torn_down(&ticket, channel).await,
        };

        if kind == ProposalKind::Collar {
            self.retract(target, prompt).await;
        }
        outcome
    }

    /// Second phase of a two-phase proposal: the initiator confirms.
    async fn await_confirmation(
        &self,
        ticket: &ProposalTicket,
        channel: ChannelId,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        if !self.settle(ticket, ProposalOutcome::Accepted)? {
            return self.torn_down(ticket, channel).await;
        }

        let proposal = ticket.proposal();
        let timeout = self.config.params().confirmation_timeout;
        info!(
            "{} accepted {}, awaiting confirmation from {}",
            proposal.counterparty, proposal.id, proposal.initiator
        );

        let prompt = self
            .notifier
            .deliver(
                Target::Channel(channel),
                Notice::ConfirmationPrompt {
                    proposal: proposal.id,
                    kind: proposal.kind,
                    initiator: proposal.initiator,
                    counterparty: proposal.counterparty,
                    timeout,
                },
            )
            .await?;

        let response = self
            .reactions
            .wait(
                GateRequest::new(prompt, timeout).from_user(proposal.initiator),
                ticket.cancellation(),
            )
            .await;

        match response {
            GateOutcome::Responded(r) if r.symbol == ReactionSymbol::Accept => {
                self.commit(ticket, ProposalOutcome::Confirmed, channel).await
            }
            GateOutcome::Responded(_) => self.decline(ticket, channel, true).await,
            GateOutcome::TimedOut => self.time_out(ticket, channel).await,
            GateOutcome::Cancelled => self.torn_down(ticket, channel).await,
        }
    }

    /// Re-validate, resolve, then persist the relationship.
    async fn commit(
        &self,
        ticket: &ProposalTicket,
        outcome: ProposalOutcome,
        channel: ChannelId,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let proposal = ticket.proposal();
        let target = Target::Channel(channel);

        if let Err(reason) = self
            .eligibility(proposal.kind, proposal.initiator, proposal.counterparty)
            .await?
        {
            if !self.settle(ticket, ProposalOutcome::Cancelled)? {
                return self.torn_down(ticket, channel).await;
            }
            info!("{} went stale before commit: {}", proposal.id, reason);
            self.announce(
                target,
                Notice::ProposalStale {
                    kind: proposal.kind,
                    initiator: proposal.initiator,
                    counterparty: proposal.counterparty,
                    reason: reason.to_string(),
                },
            )
            .await;
            return Ok(WorkflowOutcome::Stale(reason));
        }

        if !self.settle(ticket, outcome)? {
            return self.torn_down(ticket, channel).await;
        }

        let relationship = match self
            .relationships
            .create_relationship(
                proposal.kind.relationship_kind(),
                proposal.initiator,
                proposal.counterparty,
            )
            .await
        {
            Ok(relationship) => relationship,
            Err(e) => {
                warn!("Saving {} failed after acceptance: {}", proposal.id, e);
                self.announce(
                    target,
                    Notice::CommitFailed {
                        what: format!("{} between {} and {}", proposal.kind, proposal.initiator, proposal.counterparty),
                    },
                )
                .await;
                return Err(WorkflowError::CommitFailed(e.to_string()));
            }
        };

        info!(
            "Formed {} {} between {} and {}",
            relationship.kind, relationship.id, relationship.party_a, relationship.party_b
        );
        self.audit(
            "relationship_formed",
            json!({
                "proposal": proposal.id,
                "relationship": relationship.id,
                "kind": relationship.kind,
                "party_a": relationship.party_a,
                "party_b": relationship.party_b,
            }),
        );
        self.announce(
            target,
            Notice::RelationshipFormed {
                kind: proposal.kind,
                party_a: relationship.party_a,
                party_b: relationship.party_b,
            },
        )
        .await;

        Ok(WorkflowOutcome::Committed(relationship))
    }

    async fn decline(
        &self,
        ticket: &ProposalTicket,
        channel: ChannelId,
        at_confirmation: bool,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        if !self.settle(ticket, ProposalOutcome::Declined)? {
            return self.torn_down(ticket, channel).await;
        }

        let proposal = ticket.proposal();
        info!("{} declined", proposal.id);
        self.announce(
            Target::Channel(channel),
            Notice::ProposalDeclined {
                kind: proposal.kind,
                initiator: proposal.initiator,
                counterparty: proposal.counterparty,
                at_confirmation,
            },
        )
        .await;
        Ok(WorkflowOutcome::Declined)
    }

    pub(super) async fn time_out(
        &self,
        ticket: &ProposalTicket,
        channel: ChannelId,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        if ticket.expire()?.is_none() {
            return self.torn_down(ticket, channel).await;
        }
        self.report_timeout(ticket, channel).await
    }

    /// The gate closed because the proposal ended elsewhere.
    ///
    /// A sweep still counts as a timeout; anything else (withdrawal,
    /// shutdown) ends silently.
    pub(super) async fn torn_down(
        &self,
        ticket: &ProposalTicket,
        channel: ChannelId,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        if ticket.was_swept() {
            return self.report_timeout(ticket, channel).await;
        }
        debug!("Gate for {} torn down", ticket.id());
        Ok(WorkflowOutcome::Superseded)
    }

    async fn report_timeout(
        &self,
        ticket: &ProposalTicket,
        channel: ChannelId,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let proposal = ticket.proposal();
        info!("{} timed out", proposal.id);
        self.announce(
            Target::Channel(channel),
            Notice::ProposalTimedOut {
                kind: proposal.kind,
                initiator: proposal.initiator,
                counterparty: proposal.counterparty,
            },
        )
        .await;
        Ok(WorkflowOutcome::TimedOut)
    }

    /// Apply `outcome` through the ticket.
    ///
    /// Returns `false` when another resolver ended the proposal first.
    pub(super) fn settle(
        &self,
        ticket: &ProposalTicket,
        outcome: ProposalOutcome,
    ) -> Result<bool, WorkflowError> {
        match ticket.resolve(outcome) {
            Ok(_) => Ok(true),
            Err(e) if e.is_already_resolved() => {
                debug!("{} already resolved, dropping {}", ticket.id(), outcome);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
