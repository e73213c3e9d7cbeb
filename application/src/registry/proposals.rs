//! In-flight proposal tracking with per-user exclusivity.
//!
//! [`ProposalRegistry`] owns every non-terminal [`Proposal`]. At most one
//! proposal per user may be live within an [`ExclusivityDomain`]; a
//! conflicting `register` fails without touching the table. Entries are
//! removed the moment they reach a terminal state.
//!
//! Each entry carries a [`CancellationToken`] that fires on its terminal
//! transition, so gate waits bound to a proposal are torn down however the
//! proposal ends (withdrawal, sweep, a competing resolver). Sweeps are
//! remembered until the owning ticket asks, so a workflow whose gate was
//! torn down can tell an overdue proposal from a withdrawn one.
//!
//! Ids are allocated monotonically and never reused: an id below the next
//! id that is missing from the table has been resolved, an id at or above
//! it was never issued.

use crate::config::WorkflowParams;
use chrono::{DateTime, Utc};
use denkeeper_domain::{
    ConflictScope, DomainError, ExclusivityDomain, Proposal, ProposalId, ProposalKind,
    ProposalOutcome, UserId,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct Entry {
    proposal: Proposal,
    cancel: CancellationToken,
}

struct Table {
    next_id: ProposalId,
    proposals: HashMap<ProposalId, Entry>,
    holders: HashMap<(ExclusivityDomain, UserId), ProposalId>,
    /// Swept proposals whose ticket has not looked yet.
    swept: HashSet<ProposalId>,
}

impl Table {
    fn missing(&self, id: ProposalId) -> DomainError {
        if id < self.next_id {
            DomainError::AlreadyResolved {
                entity: id.to_string(),
            }
        } else {
            DomainError::NotFound {
                entity: id.to_string(),
            }
        }
    }

    fn resolve(
        &mut self,
        id: ProposalId,
        outcome: ProposalOutcome,
        now: DateTime<Utc>,
    ) -> Result<Proposal, DomainError> {
        let Some(entry) = self.proposals.get_mut(&id) else {
            return Err(self.missing(id));
        };
        entry.proposal.apply(outcome, now)?;

        let snapshot = entry.proposal.clone();
        if snapshot.state.is_terminal() {
            self.release(id);
        }
        Ok(snapshot)
    }

    fn release(&mut self, id: ProposalId) {
        let Some(entry) = self.proposals.remove(&id) else {
            return;
        };
        let domain = entry.proposal.kind.exclusivity_domain();
        for party in entry.proposal.parties() {
            if self.holders.get(&(domain, party)) == Some(&id) {
                self.holders.remove(&(domain, party));
            }
        }
        entry.cancel.cancel();
    }
}

/// Registry of pending pairwise proposals.
///
/// Cloning is cheap and every clone shares the same table.
#[derive(Clone)]
pub struct ProposalRegistry {
    params: WorkflowParams,
    table: Arc<Mutex<Table>>,
    shutdown: CancellationToken,
}

impl ProposalRegistry {
    pub fn new(params: WorkflowParams) -> Self {
        Self {
            params,
            table: Arc::new(Mutex::new(Table {
                next_id: ProposalId(1),
                proposals: HashMap::new(),
                holders: HashMap::new(),
                swept: HashSet::new(),
            })),
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancel every entry's token when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a pending proposal, reserving both parties in its domain.
    ///
    /// Fails with [`DomainError::Conflict`] if either party already holds
    /// a non-terminal proposal in the same domain.
    pub fn register(
        &self,
        initiator: UserId,
        counterparty: UserId,
        kind: ProposalKind,
    ) -> Result<ProposalTicket, DomainError> {
        let domain = kind.exclusivity_domain();
        let mut table = self.lock();

        for party in [initiator, counterparty] {
            if table.holders.contains_key(&(domain, party)) {
                return Err(DomainError::Conflict {
                    subject: party,
                    scope: ConflictScope::Proposal(domain),
                });
            }
        }

        let id = table.next_id;
        table.next_id = id.next();

        let proposal = Proposal::new(
            id,
            initiator,
            counterparty,
            kind,
            Utc::now(),
            self.params.timeout_for(kind),
        )
        .with_confirmation_window(self.params.confirmation_timeout);
        let cancel = self.shutdown.child_token();

        table.holders.insert((domain, initiator), id);
        table.holders.insert((domain, counterparty), id);
        table.proposals.insert(
            id,
            Entry {
                proposal: proposal.clone(),
                cancel: cancel.clone(),
            },
        );
        drop(table);

        info!(
            "Registered {} {} from {} to {}",
            kind, id, initiator, counterparty
        );
        Ok(ProposalTicket {
            proposal,
            cancel,
            registry: self.clone(),
        })
    }

    /// Apply `outcome` to a live proposal.
    ///
    /// Fails with [`DomainError::NotFound`] for an id never issued and
    /// [`DomainError::AlreadyResolved`] once the proposal is terminal.
    pub fn resolve(&self, id: ProposalId, outcome: ProposalOutcome) -> Result<Proposal, DomainError> {
        let resolved = self.lock().resolve(id, outcome, Utc::now())?;
        debug!("Resolved {} with {} -> {}", id, outcome, resolved.state);
        Ok(resolved)
    }

    /// Time out a proposal. An already-resolved proposal is a silent no-op.
    pub fn expire(&self, id: ProposalId) -> Result<Option<Proposal>, DomainError> {
        match self.resolve(id, ProposalOutcome::TimedOut) {
            Ok(proposal) => Ok(Some(proposal)),
            Err(e) if e.is_already_resolved() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Cancel the live proposal `user` initiated in `domain`.
    pub fn withdraw(&self, user: UserId, domain: ExclusivityDomain) -> Result<Proposal, DomainError> {
        let mut table = self.lock();
        let id = table
            .holders
            .get(&(domain, user))
            .copied()
            .filter(|id| {
                table
                    .proposals
                    .get(id)
                    .is_some_and(|e| e.proposal.initiator == user)
            })
            .ok_or_else(|| DomainError::NotFound {
                entity: format!("{} proposal by {}", domain, user),
            })?;

        let withdrawn = table.resolve(id, ProposalOutcome::Cancelled, Utc::now())?;
        drop(table);

        info!("{} withdrew {}", user, id);
        Ok(withdrawn)
    }

    /// Time out every proposal whose deadline has passed at `now`.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<Proposal> {
        let mut table = self.lock();
        let overdue: Vec<ProposalId> = table
            .proposals
            .values()
            .filter(|e| e.proposal.is_expired(now))
            .map(|e| e.proposal.id)
            .collect();

        let swept: Vec<Proposal> = overdue
            .into_iter()
            .filter_map(|id| table.resolve(id, ProposalOutcome::TimedOut, now).ok())
            .collect();
        table.swept.extend(swept.iter().map(|p| p.id));
        swept
    }

    /// Whether the sweeper timed out `id`. Answers `true` at most once.
    pub fn take_swept(&self, id: ProposalId) -> bool {
        self.lock().swept.remove(&id)
    }

    /// Snapshot of the live proposal `user` is a party to in `domain`.
    pub fn pending_for(&self, user: UserId, domain: ExclusivityDomain) -> Option<Proposal> {
        let table = self.lock();
        let id = table.holders.get(&(domain, user))?;
        table.proposals.get(id).map(|e| e.proposal.clone())
    }

    pub fn get(&self, id: ProposalId) -> Option<Proposal> {
        self.lock().proposals.get(&id).map(|e| e.proposal.clone())
    }

    /// Number of live proposals.
    pub fn len(&self) -> usize {
        self.lock().proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release_abandoned(&self, id: ProposalId) {
        let mut table = self.lock();
        table.swept.remove(&id);
        if table.proposals.contains_key(&id) {
            // The ticket is gone while the proposal is still live.
            if let Ok(p) = table.resolve(id, ProposalOutcome::Cancelled, Utc::now()) {
                warn!("Released abandoned {} {}", p.kind, id);
            }
        }
    }
}

/// Handle to a registered proposal.
///
/// Dropping the ticket while the proposal is still live cancels it, so a
/// workflow that fails or panics never leaves the parties locked.
pub struct ProposalTicket {
    proposal: Proposal,
    cancel: CancellationToken,
    registry: ProposalRegistry,
}

impl ProposalTicket {
    pub fn id(&self) -> ProposalId {
        self.proposal.id
    }

    /// Snapshot taken at registration.
    pub fn proposal(&self) -> &Proposal {
        &self.proposal
    }

    /// Fires when the proposal reaches a terminal state.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn resolve(&self, outcome: ProposalOutcome) -> Result<Proposal, DomainError> {
        self.registry.resolve(self.proposal.id, outcome)
    }

    pub fn expire(&self) -> Result<Option<Proposal>, DomainError> {
        self.registry.expire(self.proposal.id)
    }

    /// `true` if the sweeper ended this proposal as overdue.
    pub fn was_swept(&self) -> bool {
        self.registry.take_swept(self.proposal.id)
    }
}

impl Drop for ProposalTicket {
    fn drop(&mut self) {
        self.registry.release_abandoned(self.proposal.id);
    }
}
