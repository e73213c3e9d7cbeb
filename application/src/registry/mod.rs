//! Owned registries of in-flight entities.
//!
//! - [`ProposalRegistry`]: pairwise proposals, one live proposal per user
//!   per exclusivity domain
//! - [`ApprovalQueue`]: submissions awaiting review, decided exactly once

pub mod approvals;
pub mod proposals;

pub use approvals::{ApprovalQueue, SubmissionDraft};
pub use proposals::{ProposalRegistry, ProposalTicket};
