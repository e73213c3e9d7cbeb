//! Ending a relationship: divorce and escape.
//!
//! The initiator is asked to confirm their own request; no cooldown
//! applies.

use super::{WorkflowCoordinator, WorkflowError, WorkflowOutcome};
use crate::gate::{GateOutcome, GateRequest};
use crate::ports::notification::{Notice, Target};
use denkeeper_domain::{
    ChannelId, Ineligibility, ProposalKind, ProposalOutcome, ReactionSymbol, Relationship,
    RelationshipKind, RelationshipView, UserId,
};
use serde_json::json;
use tracing::{info, warn};

impl WorkflowCoordinator {
    pub async fn dissolve(
        &self,
        initiator: UserId,
        kind: ProposalKind,
        channel: ChannelId,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        if kind.forms_relationship() {
            return Err(WorkflowError::Invalid(format!("{} does not end a relationship", kind)));
        }

        self.eligibility(kind, initiator, initiator).await??;
        let relationship = self
            .current_relationship(initiator, kind)
            .await?
            .ok_or_else(|| WorkflowError::Ineligible(not_in(kind)))?;
        let partner = relationship.partner_of(initiator).unwrap_or(initiator);

        let ticket = self.proposals.register(initiator, partner, kind)?;
        let target = Target::Channel(channel);
        let timeout = self.config.params().timeout_for(kind);

        let prompt = self
            .notifier
            .deliver(
                target,
                Notice::DissolutionPrompt {
                    proposal: ticket.id(),
                    kind,
                    initiator,
                    partner,
                    timeout,
                },
            )
            .await?;

        let response = self
            .reactions
            .wait(
                GateRequest::new(prompt, timeout).from_user(initiator),
                ticket.cancellation(),
            )
            .await;

        match response {
            GateOutcome::Responded(r) if r.symbol == ReactionSymbol::Accept => {
                // The relationship may have ended while the prompt was open.
                let Some(current) = self.current_relationship(initiator, kind).await? else {
                    if !self.settle(&ticket, ProposalOutcome::Cancelled)? {
                        return self.torn_down(&ticket, channel).await;
                    }
                    let reason = not_in(kind);
                    self.announce(
                        target,
                        Notice::ProposalStale {
                            kind,
                            initiator,
                            counterparty: partner,
                            reason: reason.to_string(),
                        },
                    )
                    .await;
                    return Ok(WorkflowOutcome::Stale(reason));
                };

                if !self.settle(&ticket, ProposalOutcome::Accepted)? {
                    return self.torn_down(&ticket, channel).await;
                }

                if let Err(e) = self.relationships.delete_relationship(current.id).await {
                    warn!("Removing {} failed after confirmation: {}", current.id, e);
                    self.announce(
                        target,
                        Notice::CommitFailed {
                            what: format!("{} for {}", kind, initiator),
                        },
                    )
                    .await;
                    return Err(WorkflowError::CommitFailed(e.to_string()));
                }

                info!("{} ended {} {} with {}", initiator, current.kind, current.id, partner);
                self.audit(
                    "relationship_dissolved",
                    json!({
                        "proposal": ticket.id(),
                        "relationship": current.id,
                        "kind": current.kind,
                        "initiator": initiator,
                        "partner": partner,
                    }),
                );
                self.announce(
                    target,
                    Notice::RelationshipDissolved {
                        kind,
                        initiator,
                        partner,
                    },
                )
                .await;
                Ok(WorkflowOutcome::Dissolved(current))
            }
            GateOutcome::Responded(_) => {
                if !self.settle(&ticket, ProposalOutcome::Declined)? {
                    return self.torn_down(&ticket, channel).await;
                }
                info!("{} kept their {}", initiator, kind.relationship_kind());
                self.announce(
                    target,
                    Notice::RelationshipKept {
                        kind,
                        initiator,
                        partner,
                    },
                )
                .await;
                Ok(WorkflowOutcome::Declined)
            }
            GateOutcome::TimedOut => self.time_out(&ticket, channel).await,
            GateOutcome::Cancelled => self.torn_down(&ticket, channel).await,
        }
    }

    /// The relationship `initiator` would end with `kind`.
    async fn current_relationship(
        &self,
        initiator: UserId,
        kind: ProposalKind,
    ) -> Result<Option<Relationship>, WorkflowError> {
        let relationships = self.relationships.relationships_of(initiator).await?;
        let view = RelationshipView::new(initiator, &relationships);
        let found = match kind.relationship_kind() {
            RelationshipKind::Marriage => view.marriage(),
            RelationshipKind::Collar => view.collar(),
        };
        Ok(found.cloned())
    }
}

fn not_in(kind: ProposalKind) -> Ineligibility {
    match kind.relationship_kind() {
        RelationshipKind::Marriage => Ineligibility::NotMarried,
        RelationshipKind::Collar => Ineligibility::NotCollared,
    }
}
