//! Reviewer decisions on queued submissions.

use super::{ReviewOutcome, WorkflowCoordinator, WorkflowError};
use crate::ports::notification::{Notice, Target};
use denkeeper_domain::{Decision, ReactionEvent, Submission, SubmissionId, UserId};
use serde_json::json;
use tracing::{debug, info, warn};

impl WorkflowCoordinator {
    /// Decide submission `id`.
    ///
    /// Only the call that wins the queue's resolve step runs side effects;
    /// every other call gets [`ReviewOutcome::AlreadyResolved`].
    pub async fn review(
        &self,
        id: SubmissionId,
        reviewer: UserId,
        decision: Decision,
    ) -> Result<ReviewOutcome, WorkflowError> {
        let submission = match self
            .submissions
            .resolve(id, reviewer, decision, self.authorizer.as_ref())
        {
            Ok(submission) => submission,
            Err(e) if e.is_already_resolved() => {
                debug!("{} by {} lost the race on {}", decision, reviewer, id);
                return Ok(ReviewOutcome::AlreadyResolved);
            }
            Err(e) => return Err(e.into()),
        };

        let failure = match decision {
            Decision::Approve => self.apply_approval(&submission).await.err(),
            Decision::Deny => None,
        };

        self.audit(
            "submission_decided",
            json!({
                "submission": submission.id,
                "kind": submission.kind,
                "submitter": submission.submitter,
                "reviewer": reviewer,
                "decision": decision,
                "commit_failed": failure.is_some(),
            }),
        );

        let channels = self.config.channels();
        self.announce(
            Target::Channel(channels.log),
            Notice::ReviewDecided {
                submission: submission.id,
                kind: submission.kind,
                submitter: submission.submitter,
                reviewer,
                decision,
            },
        )
        .await;
        self.announce(
            Target::Direct(submission.submitter),
            Notice::DecisionNotice {
                kind: submission.kind,
                decision,
            },
        )
        .await;

        if let Some(message) = submission.review_ref {
            self.retract(Target::Channel(channels.review), message).await;
        }

        match failure {
            None => Ok(ReviewOutcome::Decided(submission)),
            Some(reason) => {
                self.announce(
                    Target::Channel(channels.review),
                    Notice::CommitFailed {
                        what: format!("{} {} for {}", submission.kind, submission.id, submission.submitter),
                    },
                )
                .await;
                Ok(ReviewOutcome::CommitFailed { submission, reason })
            }
        }
    }

    /// Treat a reaction on a review request as a decision.
    ///
    /// Returns `Ok(None)` when the message is not a pending review request
    /// or the emoji is not a decision.
    pub async fn review_by_reaction(
        &self,
        event: ReactionEvent,
    ) -> Result<Option<ReviewOutcome>, WorkflowError> {
        let Some(id) = self.submissions.find_by_review_ref(event.message) else {
            return Ok(None);
        };
        let Some(symbol) = event.symbol() else {
            return Ok(None);
        };
        self.review(id, event.user, symbol.decision()).await.map(Some)
    }

    /// Grant the capability or save the record an approval stands for.
    async fn apply_approval(&self, submission: &Submission) -> Result<(), String> {
        let kind = submission.kind;

        if let Some(capability) = kind.granted_capability() {
            self.authorizer
                .grant_capability(submission.submitter, capability)
                .await
                .map_err(|e| {
                    warn!("Granting {} to {} failed: {}", capability, submission.submitter, e);
                    e.to_string()
                })?;
            info!("{} is now {}", submission.submitter, capability);

            if let Some(welcome) = self.config.channels().welcome {
                self.announce(
                    Target::Channel(welcome),
                    Notice::Welcome {
                        member: submission.submitter,
                    },
                )
                .await;
            }
        }

        if kind.persists_record() {
            self.records
                .create_submission_record(submission)
                .await
                .map_err(|e| {
                    warn!("Saving {} failed after approval: {}", submission.id, e);
                    e.to_string()
                })?;
        }

        Ok(())
    }
}
