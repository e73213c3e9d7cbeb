//! Domain error types

use super::capability::Capability;
use super::ids::UserId;
use crate::approval::SubmissionKind;
use crate::proposal::ExclusivityDomain;
use thiserror::Error;

/// What a conflicting reservation was held against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictScope {
    /// A non-terminal proposal in this exclusivity domain.
    Proposal(ExclusivityDomain),
    /// A pending (or drafting) submission of this kind.
    Submission(SubmissionKind),
    /// A questionnaire of any kind still collecting DM replies.
    Questionnaire,
}

impl std::fmt::Display for ConflictScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictScope::Proposal(domain) => write!(f, "{} proposal", domain),
            ConflictScope::Submission(kind) => write!(f, "{} submission", kind),
            ConflictScope::Questionnaire => write!(f, "questionnaire"),
        }
    }
}

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{subject} already has a pending {scope}")]
    Conflict { subject: UserId, scope: ConflictScope },

    #[error("{entity} not found")]
    NotFound { entity: String },

    #[error("{entity} is already resolved")]
    AlreadyResolved { entity: String },

    #[error("{entity} cannot {action} while {state}")]
    InvalidTransition {
        entity: String,
        state: String,
        action: String,
    },

    #[error("{subject} lacks the {capability} capability")]
    Unauthorized {
        subject: UserId,
        capability: Capability,
    },
}

impl DomainError {
    /// Check if this error is the losing side of a resolve race
    pub fn is_already_resolved(&self) -> bool {
        matches!(self, DomainError::AlreadyResolved { .. })
    }

    /// Check if this error is an exclusivity conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Conflict { .. })
    }
}
