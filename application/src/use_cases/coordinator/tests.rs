use super::*;
use crate::cooldown::CooldownAction;
use crate::ports::authorization::AuthorizationError;
use crate::ports::notification::NotificationError;
use crate::ports::persistence::PersistenceError;
use crate::registry::ProposalRegistry;
use async_trait::async_trait;
use denkeeper_domain::{
    ChannelId, Decision, InteractionVerb, Relationship, RelationshipId, RelationshipKind, RoleId,
    Submission, SubmissionId, SubmissionKind, SubmissionPayload, Unmet,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

const GENERAL: ChannelId = ChannelId(1);
const MOD_A: UserId = UserId(8);
const MOD_B: UserId = UserId(9);

// ==================== Fakes ====================

#[derive(Debug, Clone)]
struct Sent {
    target: Target,
    notice: Notice,
    message: MessageId,
}

#[derive(Default)]
struct RecordingNotifier {
    next: AtomicU64,
    sent: Mutex<Vec<Sent>>,
    retracted: Mutex<Vec<MessageId>>,
    unreachable: Mutex<HashSet<Target>>,
}

impl RecordingNotifier {
    fn find(&self, pred: impl Fn(&Notice) -> bool) -> Option<Sent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .find(|s| pred(&s.notice))
            .cloned()
    }

    fn count(&self, pred: impl Fn(&Notice) -> bool) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|s| pred(&s.notice))
            .count()
    }

    fn close(&self, target: Target) {
        self.unreachable.lock().unwrap().insert(target);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, target: Target, notice: Notice) -> Result<MessageId, NotificationError> {
        if self.unreachable.lock().unwrap().contains(&target) {
            return Err(NotificationError::Unreachable(target));
        }
        let message = MessageId(1000 + self.next.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().unwrap().push(Sent {
            target,
            notice,
            message,
        });
        Ok(message)
    }

    async fn retract(&self, _target: Target, message: MessageId) -> Result<(), NotificationError> {
        self.retracted.lock().unwrap().push(message);
        Ok(())
    }
}

#[derive(Default)]
struct FakeRelationships {
    next: AtomicU64,
    rows: Mutex<Vec<Relationship>>,
    fail: AtomicBool,
}

impl FakeRelationships {
    fn seed(&self, kind: RelationshipKind, a: UserId, b: UserId) {
        let id = RelationshipId(500 + self.next.fetch_add(1, Ordering::SeqCst));
        self.rows.lock().unwrap().push(Relationship {
            id,
            kind,
            party_a: a,
            party_b: b,
            formed_at: chrono::Utc::now(),
        });
    }

    fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl RelationshipStore for FakeRelationships {
    async fn create_relationship(
        &self,
        kind: RelationshipKind,
        party_a: UserId,
        party_b: UserId,
    ) -> Result<Relationship, PersistenceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PersistenceError::Storage("disk full".to_string()));
        }
        self.seed(kind, party_a, party_b);
        Ok(self.rows.lock().unwrap().last().cloned().unwrap())
    }

    async fn delete_relationship(&self, id: RelationshipId) -> Result<(), PersistenceError> {
        self.rows.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn relationships_of(&self, user: UserId) -> Result<Vec<Relationship>, PersistenceError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.involves(user))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct FakeRecords {
    rows: Mutex<Vec<Submission>>,
    fail: AtomicBool,
}

#[async_trait]
impl SubmissionStore for FakeRecords {
    async fn create_submission_record(&self, submission: &Submission) -> Result<(), PersistenceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PersistenceError::Storage("read-only".to_string()));
        }
        self.rows.lock().unwrap().push(submission.clone());
        Ok(())
    }

    async fn has_record(&self, user: UserId, kind: SubmissionKind) -> Result<bool, PersistenceError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.submitter == user && s.kind == kind))
    }
}

#[derive(Default)]
struct FakeAuthorizer {
    capabilities: Mutex<HashMap<UserId, BTreeSet<Capability>>>,
    grants: Mutex<Vec<(UserId, Capability)>>,
}

impl FakeAuthorizer {
    fn give(&self, user: UserId, capability: Capability) {
        self.capabilities
            .lock()
            .unwrap()
            .entry(user)
            .or_default()
            .insert(capability);
    }

    fn take(&self, user: UserId, capability: Capability) {
        if let Some(caps) = self.capabilities.lock().unwrap().get_mut(&user) {
            caps.remove(&capability);
        }
    }
}

#[async_trait]
impl Authorizer for FakeAuthorizer {
    fn has_capability(&self, subject: UserId, capability: Capability) -> bool {
        self.capabilities
            .lock()
            .unwrap()
            .get(&subject)
            .is_some_and(|caps| caps.contains(&capability))
    }

    async fn grant_capability(&self, subject: UserId, capability: Capability) -> Result<(), AuthorizationError> {
        self.grants.lock().unwrap().push((subject, capability));
        self.give(subject, capability);
        Ok(())
    }

    async fn roles_of(&self, _subject: UserId) -> Result<BTreeSet<RoleId>, AuthorizationError> {
        Ok(BTreeSet::new())
    }

    async fn add_role(&self, _subject: UserId, _role: RoleId) -> Result<(), AuthorizationError> {
        Ok(())
    }

    async fn remove_role(&self, _subject: UserId, _role: RoleId) -> Result<(), AuthorizationError> {
        Ok(())
    }
}

struct Fixture {
    coordinator: Arc<WorkflowCoordinator>,
    notifier: Arc<RecordingNotifier>,
    relationships: Arc<FakeRelationships>,
    records: Arc<FakeRecords>,
    authorizer: Arc<FakeAuthorizer>,
}

fn fixture() -> Fixture {
    let notifier = Arc::new(RecordingNotifier::default());
    let relationships = Arc::new(FakeRelationships::default());
    let records = Arc::new(FakeRecords::default());
    let authorizer = Arc::new(FakeAuthorizer::default());

    for user in 1..=4 {
        authorizer.give(UserId(user), Capability::Adult);
    }
    authorizer.give(MOD_A, Capability::Moderator);
    authorizer.give(MOD_B, Capability::Moderator);

    let coordinator = Arc::new(WorkflowCoordinator::new(
        WorkflowConfig::default(),
        relationships.clone(),
        records.clone(),
        notifier.clone(),
        authorizer.clone(),
    ));

    Fixture {
        coordinator,
        notifier,
        relationships,
        records,
        authorizer,
    }
}

fn react(message: MessageId, user: UserId, emoji: &str) -> ReactionEvent {
    ReactionEvent {
        message,
        user,
        emoji: emoji.to_string(),
    }
}

async fn until<T>(mut poll: impl FnMut() -> Option<T>) -> T {
    loop {
        if let Some(value) = poll() {
            return value;
        }
        tokio::task::yield_now().await;
    }
}

/// Wait for a prompt matching `pred` and for the gate opened on it.
async fn prompt(fx: &Fixture, pred: impl Fn(&Notice) -> bool) -> MessageId {
    let sent = until(|| fx.notifier.find(&pred)).await;
    until(|| (fx.coordinator.reaction_gate().open_gates() > 0).then_some(())).await;
    sent.message
}

fn spawn_propose(
    fx: &Fixture,
    initiator: u64,
    counterparty: u64,
    kind: ProposalKind,
) -> JoinHandle<Result<WorkflowOutcome, WorkflowError>> {
    let coordinator = Arc::clone(&fx.coordinator);
    tokio::spawn(async move {
        coordinator
            .propose(UserId(initiator), UserId(counterparty), kind, GENERAL)
            .await
    })
}

/// Answer every question of a running answer-based questionnaire.
async fn answer_all(fx: &Fixture, user: UserId, count: usize) {
    for i in 0..count {
        until(|| fx.coordinator.reply_gate().is_waiting_on(user).then_some(())).await;
        assert!(
            fx.coordinator
                .handle_reply(ReplyEvent::text(user, format!("answer {}", i + 1)))
        );
    }
}

// ==================== Proposals ====================

#[tokio::test]
async fn test_marriage_declined_at_confirmation() {
    let fx = fixture();
    let handle = spawn_propose(&fx, 1, 2, ProposalKind::Marriage);

    let first = prompt(&fx, |n| matches!(n, Notice::ProposalPrompt { .. })).await;
    assert!(fx.coordinator.handle_reaction(react(first, UserId(2), "✅")).await.is_none());

    let confirm = prompt(&fx, |n| matches!(n, Notice::ConfirmationPrompt { .. })).await;
    fx.coordinator.handle_reaction(react(confirm, UserId(1), "❌")).await;

    assert_eq!(handle.await.unwrap().unwrap(), WorkflowOutcome::Declined);
    assert_eq!(fx.relationships.len(), 0);
    assert!(fx.coordinator.proposals().is_empty());
    assert_eq!(
        fx.notifier.count(|n| matches!(
            n,
            Notice::ProposalDeclined {
                at_confirmation: true,
                ..
            }
        )),
        1
    );

    // Both parties are free again.
    assert!(
        fx.coordinator
            .proposals()
            .register(UserId(2), UserId(1), ProposalKind::Marriage)
            .is_ok()
    );
}

#[tokio::test]
async fn test_marriage_confirmed_commits_once() {
    let fx = fixture();
    let handle = spawn_propose(&fx, 1, 2, ProposalKind::Marriage);

    let first = prompt(&fx, |n| matches!(n, Notice::ProposalPrompt { .. })).await;
    // Only the counterparty may answer the first phase.
    fx.coordinator.handle_reaction(react(first, UserId(1), "✅")).await;
    fx.coordinator.handle_reaction(react(first, UserId(2), "✅")).await;

    let confirm = prompt(&fx, |n| matches!(n, Notice::ConfirmationPrompt { .. })).await;
    fx.coordinator.handle_reaction(react(confirm, UserId(1), "✅")).await;

    let outcome = handle.await.unwrap().unwrap();
    assert!(matches!(outcome, WorkflowOutcome::Committed(ref r) if r.kind == RelationshipKind::Marriage));
    assert_eq!(fx.relationships.len(), 1);
    assert_eq!(
        fx.notifier
            .count(|n| matches!(n, Notice::RelationshipFormed { .. })),
        1
    );
}

#[tokio::test]
async fn test_collar_commits_with_initiator_as_owner() {
    let fx = fixture();
    let handle = spawn_propose(&fx, 1, 2, ProposalKind::Collar);

    let ask = prompt(&fx, |n| matches!(n, Notice::ProposalPrompt { .. })).await;
    fx.coordinator.handle_reaction(react(ask, UserId(2), "yes")).await;

    let WorkflowOutcome::Committed(relationship) = handle.await.unwrap().unwrap() else {
        panic!("collar was not committed");
    };
    assert_eq!(relationship.owner(), Some(UserId(1)));
    assert_eq!(relationship.pet(), Some(UserId(2)));
    assert!(fx.notifier.retracted.lock().unwrap().contains(&ask));
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_proposal_times_out() {
    let fx = fixture();
    let handle = spawn_propose(&fx, 1, 2, ProposalKind::Collar);

    assert_eq!(handle.await.unwrap().unwrap(), WorkflowOutcome::TimedOut);
    assert!(fx.coordinator.proposals().is_empty());
    assert_eq!(fx.coordinator.reaction_gate().open_gates(), 0);
    assert_eq!(
        fx.notifier
            .count(|n| matches!(n, Notice::ProposalTimedOut { .. })),
        1
    );
}

#[tokio::test]
async fn test_withdrawal_tears_down_gate_silently() {
    let fx = fixture();
    let handle = spawn_propose(&fx, 1, 2, ProposalKind::Marriage);
    prompt(&fx, |n| matches!(n, Notice::ProposalPrompt { .. })).await;

    let withdrawn = fx
        .coordinator
        .withdraw(UserId(1), ExclusivityDomain::Relationship)
        .unwrap();
    assert_eq!(withdrawn.initiator, UserId(1));

    assert_eq!(handle.await.unwrap().unwrap(), WorkflowOutcome::Superseded);
    assert_eq!(fx.coordinator.reaction_gate().open_gates(), 0);
    assert_eq!(
        fx.notifier.count(|n| matches!(
            n,
            Notice::ProposalDeclined { .. } | Notice::ProposalTimedOut { .. }
        )),
        0
    );
}

#[tokio::test]
async fn test_sweep_during_live_gate_still_reports_timeout() {
    let fx = fixture();
    let handle = spawn_propose(&fx, 1, 2, ProposalKind::Collar);
    prompt(&fx, |n| matches!(n, Notice::ProposalPrompt { .. })).await;

    // The registry deadline starts before the gate's own timer.
    let pending = fx
        .coordinator
        .proposals()
        .pending_for(UserId(1), ExclusivityDomain::Relationship)
        .unwrap();
    let swept = fx.coordinator.proposals().sweep_expired(pending.expires_at);
    assert_eq!(swept.len(), 1);

    assert_eq!(handle.await.unwrap().unwrap(), WorkflowOutcome::TimedOut);
    assert_eq!(fx.coordinator.reaction_gate().open_gates(), 0);
    assert_eq!(
        fx.notifier
            .count(|n| matches!(n, Notice::ProposalTimedOut { .. })),
        1
    );
}

#[tokio::test]
async fn test_sweep_during_confirmation_reports_timeout() {
    let fx = fixture();
    let handle = spawn_propose(&fx, 1, 2, ProposalKind::Marriage);

    let first = prompt(&fx, |n| matches!(n, Notice::ProposalPrompt { .. })).await;
    fx.coordinator.handle_reaction(react(first, UserId(2), "✅")).await;
    prompt(&fx, |n| matches!(n, Notice::ConfirmationPrompt { .. })).await;

    let pending = fx
        .coordinator
        .proposals()
        .pending_for(UserId(1), ExclusivityDomain::Relationship)
        .unwrap();
    fx.coordinator.proposals().sweep_expired(pending.expires_at);

    assert_eq!(handle.await.unwrap().unwrap(), WorkflowOutcome::TimedOut);
    assert_eq!(fx.relationships.len(), 0);
    assert_eq!(
        fx.notifier
            .count(|n| matches!(n, Notice::ProposalTimedOut { .. })),
        1
    );
}

#[tokio::test]
async fn test_validation_happens_before_register() {
    let fx = fixture();

    let err = fx
        .coordinator
        .propose(UserId(1), UserId(1), ProposalKind::Marriage, GENERAL)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Ineligible(Ineligibility::SelfTarget)));

    let err = fx
        .coordinator
        .propose(UserId(1), UserId(7), ProposalKind::Collar, GENERAL)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Ineligible(Ineligibility::NotAdult(UserId(7)))));
    assert!(err.is_validation());

    fx.relationships
        .seed(RelationshipKind::Marriage, UserId(2), UserId(3));
    let err = fx
        .coordinator
        .propose(UserId(1), UserId(2), ProposalKind::Marriage, GENERAL)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Ineligible(Ineligibility::AlreadyMarried(UserId(2)))));

    assert!(fx.coordinator.proposals().is_empty());
    assert!(fx.notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_conflict_and_cooldown() {
    let fx = fixture();
    let handle = spawn_propose(&fx, 1, 2, ProposalKind::Collar);
    prompt(&fx, |n| matches!(n, Notice::ProposalPrompt { .. })).await;

    let err = fx
        .coordinator
        .propose(UserId(3), UserId(2), ProposalKind::Marriage, GENERAL)
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    fx.coordinator
        .withdraw(UserId(1), ExclusivityDomain::Relationship)
        .unwrap();
    handle.await.unwrap().unwrap();

    let err = fx
        .coordinator
        .propose(UserId(1), UserId(3), ProposalKind::Collar, GENERAL)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::OnCooldown {
            action: CooldownAction::Propose,
            ..
        }
    ));
}

#[tokio::test]
async fn test_stale_proposal_is_not_committed() {
    let fx = fixture();
    let handle = spawn_propose(&fx, 1, 2, ProposalKind::Collar);
    let ask = prompt(&fx, |n| matches!(n, Notice::ProposalPrompt { .. })).await;

    fx.authorizer.take(UserId(2), Capability::Adult);
    fx.coordinator.handle_reaction(react(ask, UserId(2), "✅")).await;

    assert_eq!(
        handle.await.unwrap().unwrap(),
        WorkflowOutcome::Stale(Ineligibility::NotAdult(UserId(2)))
    );
    assert_eq!(fx.relationships.len(), 0);
    assert!(fx.coordinator.proposals().is_empty());
    assert_eq!(
        fx.notifier
            .count(|n| matches!(n, Notice::ProposalStale { .. })),
        1
    );
}

#[tokio::test]
async fn test_failed_save_is_commit_failed() {
    let fx = fixture();
    fx.relationships.fail.store(true, Ordering::SeqCst);
    let handle = spawn_propose(&fx, 1, 2, ProposalKind::Collar);
    let ask = prompt(&fx, |n| matches!(n, Notice::ProposalPrompt { .. })).await;

    fx.coordinator.handle_reaction(react(ask, UserId(2), "✅")).await;

    assert!(matches!(
        handle.await.unwrap(),
        Err(WorkflowError::CommitFailed(_))
    ));
    assert!(fx.coordinator.proposals().is_empty());
    assert_eq!(
        fx.notifier
            .count(|n| matches!(n, Notice::CommitFailed { .. })),
        1
    );
}

#[tokio::test]
async fn test_unreachable_channel_releases_locks() {
    let fx = fixture();
    fx.notifier.close(Target::Channel(GENERAL));

    let err = fx
        .coordinator
        .propose(UserId(1), UserId(2), ProposalKind::Collar, GENERAL)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unreachable(Target::Channel(GENERAL))));
    assert!(fx.coordinator.proposals().is_empty());
}

async fn explode(registry: ProposalRegistry) {
    let _ticket = registry
        .register(UserId(1), UserId(2), ProposalKind::Marriage)
        .unwrap();
    panic!("workflow exploded");
}

#[tokio::test]
async fn test_panicking_workflow_releases_locks() {
    let fx = fixture();
    let registry = fx.coordinator.proposals().clone();

    let outcome = WorkflowCoordinator::spawn_workflow("explode", explode(registry))
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert!(fx.coordinator.proposals().is_empty());
}

// ==================== Dissolutions ====================

#[tokio::test]
async fn test_divorce_deletes_relationship() {
    let fx = fixture();
    fx.relationships
        .seed(RelationshipKind::Marriage, UserId(1), UserId(2));

    let coordinator = Arc::clone(&fx.coordinator);
    let handle = tokio::spawn(async move {
        coordinator
            .dissolve(UserId(2), ProposalKind::Divorce, GENERAL)
            .await
    });

    let ask = prompt(&fx, |n| matches!(n, Notice::DissolutionPrompt { partner: UserId(1), .. })).await;
    // The partner cannot answer for the initiator.
    fx.coordinator.handle_reaction(react(ask, UserId(1), "✅")).await;
    fx.coordinator.handle_reaction(react(ask, UserId(2), "✅")).await;

    assert!(matches!(
        handle.await.unwrap().unwrap(),
        WorkflowOutcome::Dissolved(_)
    ));
    assert_eq!(fx.relationships.len(), 0);
}

#[tokio::test]
async fn test_escape_declined_keeps_collar() {
    let fx = fixture();
    fx.relationships
        .seed(RelationshipKind::Collar, UserId(1), UserId(2));

    let handle = spawn_propose(&fx, 2, 0, ProposalKind::Escape);
    let ask = prompt(&fx, |n| matches!(n, Notice::DissolutionPrompt { .. })).await;
    fx.coordinator.handle_reaction(react(ask, UserId(2), "❌")).await;

    assert_eq!(handle.await.unwrap().unwrap(), WorkflowOutcome::Declined);
    assert_eq!(fx.relationships.len(), 1);
    assert_eq!(
        fx.notifier
            .count(|n| matches!(n, Notice::RelationshipKept { .. })),
        1
    );
}

#[tokio::test]
async fn test_dissolve_without_relationship() {
    let fx = fixture();
    let err = fx
        .coordinator
        .dissolve(UserId(1), ProposalKind::Escape, GENERAL)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Ineligible(Ineligibility::NotCollared)));
}

// ==================== Submissions ====================

fn spawn_intake(
    fx: &Fixture,
    user: UserId,
    kind: SubmissionKind,
) -> JoinHandle<Result<IntakeOutcome, WorkflowError>> {
    let coordinator = Arc::clone(&fx.coordinator);
    tokio::spawn(async move { coordinator.begin_submission(user, kind).await })
}

#[tokio::test]
async fn test_verification_approved_then_late_deny() {
    let fx = fixture();
    let user = UserId(5);
    let handle = spawn_intake(&fx, user, SubmissionKind::Verification);
    answer_all(&fx, user, 4).await;

    let IntakeOutcome::Queued(submission) = handle.await.unwrap().unwrap() else {
        panic!("verification was not queued");
    };
    let review_ref = submission.review_ref.unwrap();
    assert_eq!(fx.coordinator.submissions().find_by_review_ref(review_ref), Some(submission.id));

    let approved = fx
        .coordinator
        .review(submission.id, MOD_A, Decision::Approve)
        .await
        .unwrap();
    assert!(matches!(approved, ReviewOutcome::Decided(ref s) if s.decision() == Some(Decision::Approve)));

    tokio::time::sleep(Duration::from_millis(50)).await;
    let late = fx
        .coordinator
        .review(submission.id, MOD_B, Decision::Deny)
        .await
        .unwrap();
    assert_eq!(late, ReviewOutcome::AlreadyResolved);

    assert_eq!(*fx.authorizer.grants.lock().unwrap(), vec![(user, Capability::Verified)]);
    assert_eq!(
        fx.notifier
            .count(|n| matches!(n, Notice::DecisionNotice { .. })),
        1
    );
    assert_eq!(fx.notifier.count(|n| matches!(n, Notice::Welcome { .. })), 1);
    assert!(fx.notifier.retracted.lock().unwrap().contains(&review_ref));
}

#[tokio::test]
async fn test_reaction_on_review_request_decides() {
    let fx = fixture();
    let submission = fx
        .coordinator
        .submissions()
        .submit(
            UserId(5),
            SubmissionKind::Profile,
            SubmissionPayload::answers(vec![]),
        )
        .unwrap();
    fx.coordinator
        .submissions()
        .attach_review_ref(submission.id, MessageId(77))
        .unwrap();

    // The submitter is not a moderator.
    assert!(
        fx.coordinator
            .handle_reaction(react(MessageId(77), UserId(5), "✅"))
            .await
            .is_none()
    );
    assert!(fx.coordinator.submissions().get(submission.id).is_some());

    let outcome = fx
        .coordinator
        .handle_reaction(react(MessageId(77), MOD_A, "✅"))
        .await;
    assert!(matches!(outcome, Some(ReviewOutcome::Decided(_))));
    assert_eq!(fx.records.rows.lock().unwrap().len(), 1);

    // Decided requests no longer route anywhere.
    assert!(
        fx.coordinator
            .handle_reaction(react(MessageId(77), MOD_B, "❌"))
            .await
            .is_none()
    );
}

#[tokio::test]
async fn test_concurrent_reviews_one_winner() {
    let fx = fixture();
    let submission = fx
        .coordinator
        .submissions()
        .submit(
            UserId(5),
            SubmissionKind::Verification,
            SubmissionPayload::answers(vec![]),
        )
        .unwrap();
    let id = submission.id;

    let reviews = (0..6).map(|i| {
        let coordinator = Arc::clone(&fx.coordinator);
        let (reviewer, decision) = if i % 2 == 0 {
            (MOD_A, Decision::Approve)
        } else {
            (MOD_B, Decision::Deny)
        };
        async move { coordinator.review(id, reviewer, decision).await.unwrap() }
    });
    let outcomes = futures::future::join_all(reviews).await;

    let winners = outcomes
        .iter()
        .filter(|o| matches!(o, ReviewOutcome::Decided(_)))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(
        fx.notifier
            .count(|n| matches!(n, Notice::ReviewDecided { .. })),
        1
    );
}

#[tokio::test]
async fn test_failed_record_save_reports_commit_failed() {
    let fx = fixture();
    fx.records.fail.store(true, Ordering::SeqCst);
    let submission = fx
        .coordinator
        .submissions()
        .submit(
            UserId(5),
            SubmissionKind::Profile,
            SubmissionPayload::answers(vec![]),
        )
        .unwrap();

    let outcome = fx
        .coordinator
        .review(submission.id, MOD_A, Decision::Approve)
        .await
        .unwrap();
    assert!(matches!(outcome, ReviewOutcome::CommitFailed { .. }));
    // The decision stands.
    assert!(fx.coordinator.submissions().get(submission.id).is_none());
    assert_eq!(
        fx.notifier
            .count(|n| matches!(n, Notice::DecisionNotice { .. })),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_questionnaire_is_abandoned() {
    let fx = fixture();
    let user = UserId(5);
    let handle = spawn_intake(&fx, user, SubmissionKind::Profile);

    assert_eq!(handle.await.unwrap().unwrap(), IntakeOutcome::Abandoned);
    assert!(!fx.coordinator.submissions().is_reserved(user, SubmissionKind::Profile));
    assert_eq!(
        fx.notifier
            .count(|n| matches!(n, Notice::QuestionnaireTimedOut { .. })),
        1
    );
}

#[tokio::test]
async fn test_second_questionnaire_is_rejected_while_one_runs() {
    let fx = fixture();
    let user = UserId(5);
    let handle = spawn_intake(&fx, user, SubmissionKind::Verification);
    until(|| fx.coordinator.reply_gate().is_waiting_on(user).then_some(())).await;

    let err = fx
        .coordinator
        .begin_submission(user, SubmissionKind::Profile)
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    // Every answer still reaches the verification questionnaire.
    answer_all(&fx, user, 4).await;
    let IntakeOutcome::Queued(submission) = handle.await.unwrap().unwrap() else {
        panic!("verification was not queued");
    };
    assert_eq!(submission.kind, SubmissionKind::Verification);
    assert!(!fx.coordinator.submissions().is_reserved(user, SubmissionKind::Profile));
}

#[tokio::test]
async fn test_closed_dms_abort_intake() {
    let fx = fixture();
    let user = UserId(5);
    fx.notifier.close(Target::Direct(user));

    let err = fx
        .coordinator
        .begin_submission(user, SubmissionKind::Verification)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unreachable(Target::Direct(UserId(5)))));

    let closed = fx
        .notifier
        .find(|n| matches!(n, Notice::DirectMessagesClosed { .. }))
        .unwrap();
    assert_eq!(closed.target, Target::Channel(ChannelId(12)));
    assert!(!fx.coordinator.submissions().is_reserved(user, SubmissionKind::Verification));
}

#[tokio::test]
async fn test_image_upload_requires_profile() {
    let fx = fixture();
    let user = UserId(5);

    let err = fx
        .coordinator
        .begin_submission(user, SubmissionKind::ProfileImage)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::PrerequisiteUnmet(Unmet::RecordMissing(SubmissionKind::Profile))
    ));

    fx.records.rows.lock().unwrap().push(Submission::new(
        SubmissionId(40),
        user,
        SubmissionKind::Profile,
        SubmissionPayload::answers(vec![]),
        chrono::Utc::now(),
    ));

    let handle = spawn_intake(&fx, user, SubmissionKind::ProfileImage);
    until(|| fx.coordinator.reply_gate().is_waiting_on(user).then_some(())).await;
    assert!(!fx.coordinator.handle_reply(ReplyEvent::text(user, "one sec")));
    assert!(
        fx.coordinator
            .handle_reply(ReplyEvent::text(user, "").with_attachment("https://cdn/ref.png"))
    );

    let IntakeOutcome::Queued(submission) = handle.await.unwrap().unwrap() else {
        panic!("image was not queued");
    };
    assert_eq!(submission.payload, SubmissionPayload::image("https://cdn/ref.png"));
}

#[tokio::test]
async fn test_verification_resubmit_cooldown() {
    let fx = fixture();
    let user = UserId(5);
    let handle = spawn_intake(&fx, user, SubmissionKind::Verification);
    answer_all(&fx, user, 4).await;
    let IntakeOutcome::Queued(submission) = handle.await.unwrap().unwrap() else {
        panic!("verification was not queued");
    };

    fx.coordinator
        .review(submission.id, MOD_A, Decision::Deny)
        .await
        .unwrap();

    let err = fx
        .coordinator
        .begin_submission(user, SubmissionKind::Verification)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::OnCooldown {
            action: CooldownAction::VerificationResubmit,
            ..
        }
    ));
}

// ==================== Interactions ====================

#[tokio::test]
async fn test_interactions() {
    let fx = fixture();
    let verified = UserId(1);
    fx.authorizer.give(verified, Capability::Verified);

    let err = fx
        .coordinator
        .interact(verified, verified, InteractionVerb::Hug, GENERAL)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Invalid(_)));

    fx.coordinator
        .interact(verified, UserId(2), InteractionVerb::Hug, GENERAL)
        .await
        .unwrap();
    let err = fx
        .coordinator
        .interact(verified, UserId(3), InteractionVerb::Hug, GENERAL)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::OnCooldown { .. }));

    // Cooldowns are per verb.
    fx.coordinator
        .interact(verified, UserId(2), InteractionVerb::Boop, GENERAL)
        .await
        .unwrap();

    // Unverified members are not rate limited.
    for _ in 0..3 {
        fx.coordinator
            .interact(UserId(2), UserId(1), InteractionVerb::Hug, GENERAL)
            .await
            .unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_sweep_purges_ended_cooldowns() {
    let fx = fixture();
    fx.authorizer.give(UserId(1), Capability::Verified);
    fx.coordinator
        .interact(UserId(1), UserId(2), InteractionVerb::Hug, GENERAL)
        .await
        .unwrap();
    assert_eq!(fx.coordinator.cooldowns().len(), 1);

    fx.coordinator.sweep();
    assert_eq!(fx.coordinator.cooldowns().len(), 1);

    tokio::time::advance(Duration::from_secs(601)).await;
    fx.coordinator.sweep();
    assert!(fx.coordinator.cooldowns().is_empty());
}
