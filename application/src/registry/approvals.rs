//! Submissions awaiting privileged review.
//!
//! [`ApprovalQueue`] holds at most one submission per (submitter, kind),
//! counting drafts still in their questionnaire. Each pending submission
//! sits behind its own guard; [`resolve`](ApprovalQueue::resolve) flips the
//! state inside that guard, so of several near-simultaneous reviewers
//! exactly one receives the decided submission and drives side effects.
//! Everyone else observes [`DomainError::AlreadyResolved`].
//!
//! Questionnaire replies arrive by DM without saying which form they
//! answer, so a member runs at most one questionnaire at a time.

use crate::ports::authorization::Authorizer;
use chrono::Utc;
use denkeeper_domain::{
    ConflictScope, Decision, DomainError, MessageId, Submission, SubmissionId, SubmissionKind,
    SubmissionPayload, UserId,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Drafting(u64),
    Pending(SubmissionId),
}

struct Pending {
    kind: SubmissionKind,
    submission: Arc<Mutex<Submission>>,
}

struct Table {
    next_id: SubmissionId,
    next_draft: u64,
    submissions: HashMap<SubmissionId, Pending>,
    holders: HashMap<(UserId, SubmissionKind), Slot>,
    review_refs: HashMap<MessageId, SubmissionId>,
}

impl Table {
    fn missing(&self, id: SubmissionId) -> DomainError {
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

    fn reserve(&mut self, submitter: UserId, kind: SubmissionKind, slot: Slot) -> Result<(), DomainError> {
        if self.holders.contains_key(&(submitter, kind)) {
            return Err(DomainError::Conflict {
                subject: submitter,
                scope: ConflictScope::Submission(kind),
            });
        }
        self.holders.insert((submitter, kind), slot);
        Ok(())
    }

    fn enqueue(
        &mut self,
        submitter: UserId,
        kind: SubmissionKind,
        payload: SubmissionPayload,
    ) -> Submission {
        let id = self.next_id;
        self.next_id = id.next();

        let submission = Submission::new(id, submitter, kind, payload, Utc::now());
        self.holders.insert((submitter, kind), Slot::Pending(id));
        self.submissions.insert(
            id,
            Pending {
                kind,
                submission: Arc::new(Mutex::new(submission.clone())),
            },
        );
        submission
    }

    fn drafting(&self, submitter: UserId) -> bool {
        self.holders
            .iter()
            .any(|((user, _), slot)| *user == submitter && matches!(slot, Slot::Drafting(_)))
    }

    fn remove(&mut self, id: SubmissionId) -> Option<Pending> {
        let pending = self.submissions.remove(&id)?;
        self.holders.retain(|_, slot| *slot != Slot::Pending(id));
        self.review_refs.retain(|_, sub| *sub != id);
        Some(pending)
    }
}

/// Queue of submissions awaiting a reviewer.
///
/// Cloning is cheap and every clone shares the same table.
#[derive(Clone)]
pub struct ApprovalQueue {
    table: Arc<Mutex<Table>>,
}

impl Default for ApprovalQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ApprovalQueue {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                next_id: SubmissionId(1),
                next_draft: 1,
                submissions: HashMap::new(),
                holders: HashMap::new(),
                review_refs: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a submission directly.
    ///
    /// Fails with [`DomainError::Conflict`] if the submitter already has one
    /// of this kind pending or in progress.
    pub fn submit(
        &self,
        submitter: UserId,
        kind: SubmissionKind,
        payload: SubmissionPayload,
    ) -> Result<Submission, DomainError> {
        let mut table = self.lock();
        table.reserve(submitter, kind, Slot::Drafting(0))?;
        let submission = table.enqueue(submitter, kind, payload);
        drop(table);

        info!("Queued {} {} from {}", kind, submission.id, submitter);
        Ok(submission)
    }

    /// Hold the (submitter, kind) slot while a questionnaire runs.
    ///
    /// Fails with a [`ConflictScope::Questionnaire`] conflict while another
    /// of the submitter's questionnaires is still open.
    pub fn reserve(&self, submitter: UserId, kind: SubmissionKind) -> Result<SubmissionDraft, DomainError> {
        let mut table = self.lock();
        if !table.holders.contains_key(&(submitter, kind)) && table.drafting(submitter) {
            return Err(DomainError::Conflict {
                subject: submitter,
                scope: ConflictScope::Questionnaire,
            });
        }
        let draft = table.next_draft;
        table.reserve(submitter, kind, Slot::Drafting(draft))?;
        table.next_draft += 1;
        drop(table);

        debug!("Reserved {} draft for {}", kind, submitter);
        Ok(SubmissionDraft {
            queue: self.clone(),
            submitter,
            kind,
            draft,
            submitted: false,
        })
    }

    /// Decide a pending submission.
    ///
    /// `reviewer` must hold the kind's reviewer capability. Exactly one of
    /// several concurrent calls succeeds; the rest get
    /// [`DomainError::AlreadyResolved`].
    pub fn resolve(
        &self,
        id: SubmissionId,
        reviewer: UserId,
        decision: Decision,
        authorizer: &dyn Authorizer,
    ) -> Result<Submission, DomainError> {
        let (kind, entry) = {
            let table = self.lock();
            match table.submissions.get(&id) {
                Some(pending) => (pending.kind, Arc::clone(&pending.submission)),
                None => return Err(table.missing(id)),
            }
        };

        let capability = kind.reviewer_capability();
        if !authorizer.has_capability(reviewer, capability) {
            return Err(DomainError::Unauthorized {
                subject: reviewer,
                capability,
            });
        }

        let decided = {
            let mut submission = entry.lock().unwrap_or_else(|e| e.into_inner());
            submission.decide(reviewer, decision)?;
            submission.clone()
        };
        self.lock().remove(id);

        info!("Decided {} ({}) by {}", id, decision, reviewer);
        Ok(decided)
    }

    /// Link the review-channel message whose reactions decide `id`.
    pub fn attach_review_ref(&self, id: SubmissionId, message: MessageId) -> Result<(), DomainError> {
        let mut table = self.lock();
        let Some(pending) = table.submissions.get(&id) else {
            return Err(table.missing(id));
        };
        pending
            .submission
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .review_ref = Some(message);
        table.review_refs.insert(message, id);
        Ok(())
    }

    pub fn find_by_review_ref(&self, message: MessageId) -> Option<SubmissionId> {
        self.lock().review_refs.get(&message).copied()
    }

    /// Drop a pending submission without deciding it.
    pub fn withdraw(&self, id: SubmissionId) -> Result<Submission, DomainError> {
        let mut table = self.lock();
        let Some(pending) = table.remove(id) else {
            return Err(table.missing(id));
        };
        let submission = pending
            .submission
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        Ok(submission)
    }

    /// Snapshot of a pending submission.
    pub fn get(&self, id: SubmissionId) -> Option<Submission> {
        let table = self.lock();
        let pending = table.submissions.get(&id)?;
        let submission = pending.submission.lock().unwrap_or_else(|e| e.into_inner());
        Some(submission.clone())
    }

    pub fn pending_for(&self, submitter: UserId, kind: SubmissionKind) -> Option<SubmissionId> {
        match self.lock().holders.get(&(submitter, kind)) {
            Some(Slot::Pending(id)) => Some(*id),
            _ => None,
        }
    }

    /// Whether the slot is held, pending or drafting.
    pub fn is_reserved(&self, submitter: UserId, kind: SubmissionKind) -> bool {
        self.lock().holders.contains_key(&(submitter, kind))
    }

    /// Number of pending submissions.
    pub fn len(&self) -> usize {
        self.lock().submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A reserved (submitter, kind) slot with no submission yet.
///
/// Dropping an unsubmitted draft frees the slot.
pub struct SubmissionDraft {
    queue: ApprovalQueue,
    submitter: UserId,
    kind: SubmissionKind,
    draft: u64,
    submitted: bool,
}

impl SubmissionDraft {
    pub fn submitter(&self) -> UserId {
        self.submitter
    }

    pub fn kind(&self) -> SubmissionKind {
        self.kind
    }

    /// Turn the draft into a pending submission.
    pub fn submit(mut self, payload: SubmissionPayload) -> Submission {
        let submission = self
            .queue
            .lock()
            .enqueue(self.submitter, self.kind, payload);
        self.submitted = true;

        info!(
            "Queued {} {} from {}",
            self.kind, submission.id, self.submitter
        );
        submission
    }
}

impl Drop for SubmissionDraft {
    fn drop(&mut self) {
        if self.submitted {
            return;
        }
        let mut table = self.queue.lock();
        if table.holders.get(&(self.submitter, self.kind)) == Some(&Slot::Drafting(self.draft)) {
            table.holders.remove(&(self.submitter, self.kind));
            debug!("Released {} draft for {}", self.kind, self.submitter);
        }
    }
}
