//! Domain layer for denkeeper
//!
//! This crate contains the entities, state machines and pure rules behind
//! denkeeper's reaction-gated workflows. It has no dependencies on
//! infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Proposals
//!
//! A [`Proposal`] is a pairwise request ("marry me", "wear my collar")
//! resolved by the counterparty's reaction, optionally followed by a
//! confirmation from the initiator. Dissolutions (divorce, escape) reuse
//! the same machine with the initiator confirming their own request.
//!
//! ## Submissions
//!
//! A [`Submission`] is a single-party request (verification, character
//! profile, profile image) decided once by a moderator.
//!
//! ## Level rewards
//!
//! [`LevelLadder`] turns a level into the set of reward roles a member
//! should hold; [`RoleDiff`] reconciles that with what they have.

pub mod approval;
pub mod core;
pub mod interaction;
pub mod leveling;
pub mod proposal;
pub mod reaction;
pub mod relationship;

// Re-export commonly used types
pub use approval::{
    Answer, Decision, Prerequisite, Submission, SubmissionKind, SubmissionPayload, SubmissionState,
    Unmet,
};
pub use core::{
    capability::Capability,
    error::{ConflictScope, DomainError},
    ids::{ChannelId, MessageId, ProposalId, RelationshipId, RoleId, SubmissionId, UserId},
};
pub use interaction::{InteractionCategory, InteractionVerb};
pub use leveling::{LevelLadder, LevelReward, RoleDiff};
pub use proposal::{
    EligibilityFacts, ExclusivityDomain, Ineligibility, Proposal, ProposalKind, ProposalOutcome,
    ProposalState, Responder,
};
pub use reaction::{ReactionEvent, ReactionSymbol, ReplyEvent};
pub use relationship::{Relationship, RelationshipKind, RelationshipView};
