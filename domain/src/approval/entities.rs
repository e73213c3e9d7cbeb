//! Submission entity and reviewer decisions.

use super::kind::SubmissionKind;
use crate::core::error::DomainError;
use crate::core::ids::{MessageId, SubmissionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One question of a questionnaire together with the submitter's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmissionPayload {
    Answers { answers: Vec<Answer> },
    Image { url: String },
}

impl SubmissionPayload {
    pub fn answers(answers: Vec<Answer>) -> Self {
        SubmissionPayload::Answers { answers }
    }

    pub fn image(url: impl Into<String>) -> Self {
        SubmissionPayload::Image { url: url.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Deny,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve => write!(f, "approve"),
            Decision::Deny => write!(f, "deny"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    Pending,
    Approved { by: UserId },
    Denied { by: UserId },
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionState::Pending)
    }

    pub fn reviewer(&self) -> Option<UserId> {
        match self {
            SubmissionState::Pending => None,
            SubmissionState::Approved { by } | SubmissionState::Denied { by } => Some(*by),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub submitter: UserId,
    pub kind: SubmissionKind,
    pub payload: SubmissionPayload,
    /// Moderator-channel message whose reactions review this submission.
    pub review_ref: Option<MessageId>,
    pub state: SubmissionState,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        id: SubmissionId,
        submitter: UserId,
        kind: SubmissionKind,
        payload: SubmissionPayload,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            submitter,
            kind,
            payload,
            review_ref: None,
            state: SubmissionState::Pending,
            submitted_at: now,
        }
    }

    /// Record a reviewer decision. Only a pending submission can be decided.
    pub fn decide(&mut self, reviewer: UserId, decision: Decision) -> Result<(), DomainError> {
        if self.state.is_terminal() {
            return Err(DomainError::AlreadyResolved {
                entity: self.id.to_string(),
            });
        }
        self.state = match decision {
            Decision::Approve => SubmissionState::Approved { by: reviewer },
            Decision::Deny => SubmissionState::Denied { by: reviewer },
        };
        Ok(())
    }

    pub fn decision(&self) -> Option<Decision> {
        match self.state {
            SubmissionState::Pending => None,
            SubmissionState::Approved { .. } => Some(Decision::Approve),
            SubmissionState::Denied { .. } => Some(Decision::Deny),
        }
    }
}
