//! Notification port
//!
//! Workflows describe what to tell whom with a structured [`Notice`];
//! rendering it into text or embeds is the adapter's business.
//!
//! A prompt that expects a reaction is delivered first, then a
//! [`ReactionGate`](crate::gate::ReactionGate) is opened on the returned
//! message id.

use async_trait::async_trait;
use denkeeper_domain::{
    ChannelId, Decision, InteractionVerb, MessageId, ProposalId, ProposalKind, SubmissionId,
    SubmissionKind, SubmissionPayload, UserId,
};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Where a notice is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Channel(ChannelId),
    /// Direct message to a member.
    Direct(UserId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Channel(channel) => write!(f, "{}", channel),
            Target::Direct(user) => write!(f, "DM {}", user),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// The target cannot receive messages (DMs closed, channel gone).
    /// Never retried.
    #[error("{0} is unreachable")]
    Unreachable(Target),

    #[error("Delivery failed: {0}")]
    Transport(String),
}

/// Everything a workflow may tell a member, channel or moderator.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    // ==================== Proposals ====================
    /// Asks the counterparty to accept or decline.
    ProposalPrompt {
        proposal: ProposalId,
        kind: ProposalKind,
        initiator: UserId,
        counterparty: UserId,
        timeout: Duration,
    },
    /// Asks the initiator of an accepted marriage to confirm.
    ConfirmationPrompt {
        proposal: ProposalId,
        kind: ProposalKind,
        initiator: UserId,
        counterparty: UserId,
        timeout: Duration,
    },
    /// Asks the initiator to confirm ending a relationship.
    DissolutionPrompt {
        proposal: ProposalId,
        kind: ProposalKind,
        initiator: UserId,
        partner: UserId,
        timeout: Duration,
    },
    ProposalDeclined {
        kind: ProposalKind,
        initiator: UserId,
        counterparty: UserId,
        /// Declined by the initiator at the confirmation step.
        at_confirmation: bool,
    },
    ProposalTimedOut {
        kind: ProposalKind,
        initiator: UserId,
        counterparty: UserId,
    },
    /// A party became ineligible while the proposal was pending.
    ProposalStale {
        kind: ProposalKind,
        initiator: UserId,
        counterparty: UserId,
        reason: String,
    },
    RelationshipFormed {
        kind: ProposalKind,
        party_a: UserId,
        party_b: UserId,
    },
    RelationshipDissolved {
        kind: ProposalKind,
        initiator: UserId,
        partner: UserId,
    },
    /// The initiator backed out of ending the relationship.
    RelationshipKept {
        kind: ProposalKind,
        initiator: UserId,
        partner: UserId,
    },
    /// A committed decision could not be saved.
    CommitFailed { what: String },

    // ==================== Submissions ====================
    Question {
        kind: SubmissionKind,
        index: usize,
        total: usize,
        text: String,
    },
    QuestionnaireTimedOut { kind: SubmissionKind },
    SubmissionReceived { kind: SubmissionKind },
    /// Posted in the review channel; moderators react on it.
    ReviewRequest {
        submission: SubmissionId,
        kind: SubmissionKind,
        submitter: UserId,
        payload: SubmissionPayload,
    },
    /// Decision entry for the moderator log channel.
    ReviewDecided {
        submission: SubmissionId,
        kind: SubmissionKind,
        submitter: UserId,
        reviewer: UserId,
        decision: Decision,
    },
    /// Tells the submitter how their submission was decided.
    DecisionNotice {
        kind: SubmissionKind,
        decision: Decision,
    },
    Welcome { member: UserId },
    /// Posted publicly when a member's DMs are closed.
    DirectMessagesClosed { member: UserId },

    // ==================== Community ====================
    LevelRoleEarned {
        member: UserId,
        level: u32,
        role_name: String,
    },
    InteractionPerformed {
        verb: InteractionVerb,
        actor: UserId,
        target: UserId,
    },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notice and return the posted message's id.
    async fn deliver(&self, target: Target, notice: Notice) -> Result<MessageId, NotificationError>;

    /// Delete a previously delivered message.
    async fn retract(&self, target: Target, message: MessageId) -> Result<(), NotificationError>;
}
