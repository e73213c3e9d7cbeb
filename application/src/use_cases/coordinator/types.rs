//! Type definitions for the workflow coordinator.

use crate::cooldown::CooldownAction;
use crate::ports::authorization::AuthorizationError;
use crate::ports::notification::{NotificationError, Target};
use crate::ports::persistence::PersistenceError;
use denkeeper_domain::{DomainError, Ineligibility, Relationship, Submission, Unmet};
use std::time::Duration;
use thiserror::Error;

/// Errors that end a workflow early.
#[derive(Error, Debug, Clone)]
pub enum WorkflowError {
    #[error("{0}")]
    Ineligible(#[from] Ineligibility),

    #[error("{0}")]
    PrerequisiteUnmet(#[from] Unmet),

    #[error("{action} is on cooldown for another {}s", .remaining.as_secs().max(1))]
    OnCooldown {
        action: CooldownAction,
        remaining: Duration,
    },

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Saving failed after the decision was made: {0}")]
    CommitFailed(String),

    #[error("{0} is unreachable")]
    Unreachable(Target),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Lookup failed: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Role update failed: {0}")]
    Authorization(#[from] AuthorizationError),
}

impl From<NotificationError> for WorkflowError {
    fn from(e: NotificationError) -> Self {
        match e {
            NotificationError::Unreachable(target) => WorkflowError::Unreachable(target),
            NotificationError::Transport(msg) => WorkflowError::Notification(msg),
        }
    }
}

impl WorkflowError {
    /// Rejected before any entity was created.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WorkflowError::Ineligible(_)
                | WorkflowError::PrerequisiteUnmet(_)
                | WorkflowError::OnCooldown { .. }
                | WorkflowError::Invalid(_)
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, WorkflowError::Domain(e) if e.is_conflict())
    }
}

/// How a proposal or dissolution workflow ended.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    /// A relationship was formed and persisted.
    Committed(Relationship),
    /// A relationship was ended and removed.
    Dissolved(Relationship),
    Declined,
    TimedOut,
    /// A party became ineligible before commit; nothing was persisted.
    Stale(Ineligibility),
    /// Another resolver (withdrawal, sweep, shutdown) ended the proposal first.
    Superseded,
}

/// How a submission intake ended.
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    /// Queued for review; the review request is posted.
    Queued(Submission),
    /// The questionnaire was not completed.
    Abandoned,
}

/// How a reviewer decision ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    /// This reviewer's decision won and every side effect ran.
    Decided(Submission),
    /// Another reviewer decided first; nothing happened.
    AlreadyResolved,
    /// The decision is committed but applying it failed.
    CommitFailed { submission: Submission, reason: String },
}
