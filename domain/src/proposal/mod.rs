//! Pairwise proposals: kinds, state machine and eligibility rules.

pub mod eligibility;
pub mod entities;
pub mod kind;

pub use eligibility::{EligibilityFacts, Ineligibility};
pub use entities::{Proposal, ProposalOutcome, ProposalState};
pub use kind::{ExclusivityDomain, ProposalKind, Responder};
