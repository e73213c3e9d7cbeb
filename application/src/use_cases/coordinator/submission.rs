//! Submission intake: questionnaire over DM, then queue for review.

use super::{IntakeOutcome, WorkflowCoordinator, WorkflowError};
use crate::cooldown::CooldownAction;
use crate::gate::GateOutcome;
use crate::ports::notification::{NotificationError, Notice, Target};
use denkeeper_domain::{Answer, Prerequisite, SubmissionKind, SubmissionPayload, UserId};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why a questionnaire stopped before it was complete.
enum Interrupted {
    TimedOut,
    Cancelled,
}

impl WorkflowCoordinator {
    /// Run the questionnaire for `kind` with `user` and queue the result.
    ///
    /// The (user, kind) slot is held from the first question until the
    /// submission is decided; an abandoned questionnaire frees it.
    pub async fn begin_submission(
        &self,
        user: UserId,
        kind: SubmissionKind,
    ) -> Result<IntakeOutcome, WorkflowError> {
        if kind.has_resubmit_cooldown() {
            let action = CooldownAction::VerificationResubmit;
            let remaining = self.cooldowns.check(user, action);
            if !remaining.is_zero() {
                return Err(WorkflowError::OnCooldown { action, remaining });
            }
        }

        self.check_prerequisite(user, kind).await?;
        let draft = self.submissions.reserve(user, kind)?;
        let cancel = self.shutdown.child_token();

        let payload = match self.questionnaire(user, kind, &cancel).await? {
            Ok(payload) => payload,
            Err(Interrupted::TimedOut) => {
                info!("{} questionnaire for {} timed out", kind, user);
                self.announce(Target::Direct(user), Notice::QuestionnaireTimedOut { kind })
                    .await;
                return Ok(IntakeOutcome::Abandoned);
            }
            Err(Interrupted::Cancelled) => {
                debug!("{} questionnaire for {} cancelled", kind, user);
                return Ok(IntakeOutcome::Abandoned);
            }
        };

        let mut submission = draft.submit(payload);
        let review_channel = Target::Channel(self.config.channels().review);
        let review_ref = match self
            .notifier
            .deliver(
                review_channel,
                Notice::ReviewRequest {
                    submission: submission.id,
                    kind,
                    submitter: user,
                    payload: submission.payload.clone(),
                },
            )
            .await
        {
            Ok(message) => message,
            Err(e) => {
                warn!("Review request for {} not posted: {}", submission.id, e);
                if let Err(e) = self.submissions.withdraw(submission.id) {
                    debug!("Withdrawing {} failed: {}", submission.id, e);
                }
                return Err(e.into());
            }
        };
        self.submissions.attach_review_ref(submission.id, review_ref)?;
        submission.review_ref = Some(review_ref);

        if kind.has_resubmit_cooldown() {
            self.cooldowns
                .record(user, CooldownAction::VerificationResubmit, Instant::now());
        }

        self.announce(Target::Direct(user), Notice::SubmissionReceived { kind })
            .await;
        Ok(IntakeOutcome::Queued(submission))
    }

    async fn check_prerequisite(&self, user: UserId, kind: SubmissionKind) -> Result<(), WorkflowError> {
        let prerequisite = kind.prerequisite();
        let met = match prerequisite {
            Prerequisite::LacksCapability(capability) => {
                !self.authorizer.has_capability(user, capability)
            }
            Prerequisite::NoRecord(record) => !self.records.has_record(user, record).await?,
            Prerequisite::HasRecord(record) => self.records.has_record(user, record).await?,
        };

        if met {
            Ok(())
        } else {
            Err(prerequisite.unmet().into())
        }
    }

    async fn questionnaire(
        &self,
        user: UserId,
        kind: SubmissionKind,
        cancel: &CancellationToken,
    ) -> Result<Result<SubmissionPayload, Interrupted>, WorkflowError> {
        let timeout = self.config.params().answer_timeout;

        if kind.expects_image() {
            let prompt = self.config.questionnaires().image_prompt.clone();
            self.ask(user, kind, 1, 1, prompt).await?;

            return Ok(
                match self.replies.wait_for_attachment(user, timeout, cancel).await {
                    GateOutcome::Responded(reply) => match reply.attachments.into_iter().next() {
                        Some(url) => Ok(SubmissionPayload::image(url)),
                        None => Err(Interrupted::Cancelled),
                    },
                    GateOutcome::TimedOut => Err(Interrupted::TimedOut),
                    GateOutcome::Cancelled => Err(Interrupted::Cancelled),
                },
            );
        }

        let questions = self.config.questionnaires().questions_for(kind);
        let total = questions.len();
        let mut answers = Vec::with_capacity(total);

        for (index, question) in questions.iter().enumerate() {
            self.ask(user, kind, index + 1, total, question.clone()).await?;

            match self.replies.wait_for_text(user, timeout, cancel).await {
                GateOutcome::Responded(reply) => answers.push(Answer {
                    question: question.clone(),
                    answer: reply.content.trim().to_string(),
                }),
                GateOutcome::TimedOut => return Ok(Err(Interrupted::TimedOut)),
                GateOutcome::Cancelled => return Ok(Err(Interrupted::Cancelled)),
            }
        }

        Ok(Ok(SubmissionPayload::answers(answers)))
    }

    /// DM one question. Closed DMs are announced in the verification channel.
    async fn ask(
        &self,
        user: UserId,
        kind: SubmissionKind,
        index: usize,
        total: usize,
        text: String,
    ) -> Result<(), WorkflowError> {
        let question = Notice::Question {
            kind,
            index,
            total,
            text,
        };
        match self.notifier.deliver(Target::Direct(user), question).await {
            Ok(_) => Ok(()),
            Err(NotificationError::Unreachable(target)) => {
                info!("{} has direct messages closed", user);
                self.announce(
                    Target::Channel(self.config.channels().verification),
                    Notice::DirectMessagesClosed { member: user },
                )
                .await;
                Err(WorkflowError::Unreachable(target))
            }
            Err(e) => Err(e.into()),
        }
    }
}
