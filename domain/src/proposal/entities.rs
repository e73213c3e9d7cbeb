//! Proposal entity and its state machine.
//!
//! # State Transitions
//!
//! ```text
//! Pending ──Accepted──> Accepted                      (single-phase)
//!    │
//!    ├──Accepted──> AwaitingConfirmation ──Confirmed──> Accepted
//!    │                     │
//!    └──Declined / TimedOut / Cancelled ──> terminal <─┘
//! ```
//!
//! Terminal states are sticky: every further outcome is answered with
//! [`DomainError::AlreadyResolved`].

use super::kind::{ProposalKind, Responder};
use crate::core::error::DomainError;
use crate::core::ids::{ProposalId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalState {
    /// Waiting on the responder.
    Pending,
    /// Counterparty accepted; waiting on the initiator's confirmation.
    AwaitingConfirmation,
    Accepted,
    Declined,
    TimedOut,
    Cancelled,
}

impl ProposalState {
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            ProposalState::Pending | ProposalState::AwaitingConfirmation
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalState::Pending => "pending",
            ProposalState::AwaitingConfirmation => "awaiting confirmation",
            ProposalState::Accepted => "accepted",
            ProposalState::Declined => "declined",
            ProposalState::TimedOut => "timed out",
            ProposalState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An outcome a resolver may apply to a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalOutcome {
    /// The responder accepted. Moves two-phase proposals to
    /// [`ProposalState::AwaitingConfirmation`].
    Accepted,
    /// The initiator confirmed a two-phase proposal.
    Confirmed,
    Declined,
    TimedOut,
    Cancelled,
}

impl fmt::Display for ProposalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProposalOutcome::Accepted => "accept",
            ProposalOutcome::Confirmed => "confirm",
            ProposalOutcome::Declined => "decline",
            ProposalOutcome::TimedOut => "time out",
            ProposalOutcome::Cancelled => "cancel",
        };
        write!(f, "{}", s)
    }
}

/// A pairwise proposal awaiting a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub initiator: UserId,
    pub counterparty: UserId,
    pub kind: ProposalKind,
    pub created_at: DateTime<Utc>,
    /// Deadline of the current phase.
    pub expires_at: DateTime<Utc>,
    pub state: ProposalState,
    /// Length of the confirmation phase (two-phase kinds only).
    pub confirmation_window: Option<Duration>,
}

impl Proposal {
    /// Create a new pending proposal whose first phase lasts `response_window`.
    pub fn new(
        id: ProposalId,
        initiator: UserId,
        counterparty: UserId,
        kind: ProposalKind,
        now: DateTime<Utc>,
        response_window: Duration,
    ) -> Self {
        Self {
            id,
            initiator,
            counterparty,
            kind,
            created_at: now,
            expires_at: deadline(now, response_window),
            state: ProposalState::Pending,
            confirmation_window: None,
        }
    }

    /// Set the confirmation window used when a two-phase proposal is accepted.
    pub fn with_confirmation_window(mut self, window: Duration) -> Self {
        self.confirmation_window = Some(window);
        self
    }

    /// Both parties, initiator first. Dissolutions may name the same user twice.
    pub fn parties(&self) -> [UserId; 2] {
        [self.initiator, self.counterparty]
    }

    pub fn involves(&self, user: UserId) -> bool {
        self.initiator == user || self.counterparty == user
    }

    /// The user whose reaction resolves the current phase.
    pub fn awaited_responder(&self) -> UserId {
        match (self.state, self.kind.responder()) {
            (ProposalState::AwaitingConfirmation, _) => self.initiator,
            (_, Responder::Counterparty) => self.counterparty,
            (_, Responder::Initiator) => self.initiator,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.state.is_terminal() && now >= self.expires_at
    }

    /// Apply an outcome, enforcing the state machine.
    ///
    /// `now` re-arms the deadline when a two-phase proposal enters its
    /// confirmation phase.
    pub fn apply(&mut self, outcome: ProposalOutcome, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.state.is_terminal() {
            return Err(DomainError::AlreadyResolved {
                entity: self.id.to_string(),
            });
        }

        let next = match (outcome, self.state) {
            (ProposalOutcome::Accepted, ProposalState::Pending) => {
                if self.kind.requires_confirmation() {
                    let window = self.confirmation_window.unwrap_or_default();
                    self.expires_at = deadline(now, window);
                    ProposalState::AwaitingConfirmation
                } else {
                    ProposalState::Accepted
                }
            }
            (ProposalOutcome::Confirmed, ProposalState::AwaitingConfirmation) => {
                ProposalState::Accepted
            }
            (ProposalOutcome::Accepted, _) | (ProposalOutcome::Confirmed, _) => {
                return Err(DomainError::InvalidTransition {
                    entity: self.id.to_string(),
                    state: self.state.to_string(),
                    action: outcome.to_string(),
                });
            }
            (ProposalOutcome::Declined, _) => ProposalState::Declined,
            (ProposalOutcome::TimedOut, _) => ProposalState::TimedOut,
            (ProposalOutcome::Cancelled, _) => ProposalState::Cancelled,
        };

        self.state = next;
        Ok(())
    }
}

fn deadline(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    let delta = chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX);
    now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
