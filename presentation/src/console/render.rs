//! Text rendering for notices and workflow results

use colored::Colorize;
use denkeeper_application::{IntakeOutcome, Notice, ReviewOutcome, WorkflowError, WorkflowOutcome};
use denkeeper_domain::{
    Decision, InteractionCategory, InteractionVerb, MessageId, ProposalKind, ReactionSymbol,
    SubmissionKind, SubmissionPayload,
};
use std::time::Duration;

/// Formats notices and workflow results for the console
pub struct ConsoleRenderer;

impl ConsoleRenderer {
    /// Render a notice as the text of a chat message.
    pub fn notice(notice: &Notice) -> String {
        match notice {
            // ==================== Proposals ====================
            Notice::ProposalPrompt {
                kind,
                initiator,
                counterparty,
                timeout,
                ..
            } => format!(
                "{} {} {} {}. {}",
                initiator,
                Self::asks(*kind),
                counterparty,
                Self::verb_phrase(*kind),
                Self::reaction_hint(*timeout)
            ),
            Notice::ConfirmationPrompt {
                initiator,
                counterparty,
                timeout,
                ..
            } => format!(
                "{} said yes! {}, do you confirm? {}",
                counterparty,
                initiator,
                Self::reaction_hint(*timeout)
            ),
            Notice::DissolutionPrompt {
                kind,
                initiator,
                partner,
                timeout,
                ..
            } => {
                let action = match kind {
                    ProposalKind::Escape => format!("slip out of {}'s collar", partner),
                    _ => format!("divorce {}", partner),
                };
                format!(
                    "{}, are you sure you want to {}? {}",
                    initiator,
                    action,
                    Self::reaction_hint(*timeout)
                )
            }
            Notice::ProposalDeclined {
                initiator,
                counterparty,
                at_confirmation: true,
                ..
            } => format!("{} backed out. {} stays single.", initiator, counterparty),
            Notice::ProposalDeclined {
                kind,
                initiator,
                counterparty,
                at_confirmation: false,
            } => format!("{} declined {}'s {}.", counterparty, initiator, kind),
            Notice::ProposalTimedOut {
                kind,
                initiator,
                counterparty,
            } => format!(
                "{}'s {} to {} went unanswered.",
                initiator, kind, counterparty
            )
            .dimmed()
            .to_string(),
            Notice::ProposalStale {
                kind,
                initiator,
                counterparty,
                reason,
            } => format!(
                "{}'s {} to {} can't go ahead: {}",
                initiator, kind, counterparty, reason
            ),
            Notice::RelationshipFormed {
                kind,
                party_a,
                party_b,
            } => match kind {
                ProposalKind::Collar => format!("{} now wears {}'s collar!", party_b, party_a),
                _ => format!("{} and {} are now married!", party_a, party_b),
            }
            .green()
            .bold()
            .to_string(),
            Notice::RelationshipDissolved {
                kind,
                initiator,
                partner,
            } => match kind {
                ProposalKind::Escape => format!("{} escaped {}'s collar.", initiator, partner),
                _ => format!("{} and {} are divorced.", initiator, partner),
            },
            Notice::RelationshipKept { initiator, partner, .. } => {
                format!("{} stays with {}.", initiator, partner)
            }
            Notice::CommitFailed { what } => {
                format!("Saving {} failed. The decision stands.", what)
                    .red()
                    .to_string()
            }

            // ==================== Submissions ====================
            Notice::Question {
                kind,
                index,
                total,
                text,
            } => format!("[{} {}/{}] {}", kind, index + 1, total, text),
            Notice::QuestionnaireTimedOut { kind } => {
                format!("Your {} timed out. Start again when you're ready.", kind)
            }
            Notice::SubmissionReceived { kind } => {
                format!("Your {} was sent to the moderators.", kind)
            }
            Notice::ReviewRequest {
                submission,
                kind,
                submitter,
                payload,
            } => {
                let mut text = format!(
                    "{} {} from {} ({} approve / {} deny)",
                    "Review".yellow().bold(),
                    Self::kind_title(*kind),
                    submitter,
                    ReactionSymbol::Accept,
                    ReactionSymbol::Decline
                );
                text.push_str(&format!(" [{}]", submission));
                match payload {
                    SubmissionPayload::Answers { answers } => {
                        for answer in answers {
                            text.push_str(&format!("\n    {} {}", answer.question.cyan(), answer.answer));
                        }
                    }
                    SubmissionPayload::Image { url } => text.push_str(&format!("\n    {}", url)),
                }
                text
            }
            Notice::ReviewDecided {
                submission,
                kind,
                submitter,
                reviewer,
                decision,
            } => format!(
                "{} {}'s {} ({}) by {}",
                Self::decision_word(*decision),
                submitter,
                kind,
                submission,
                reviewer
            ),
            Notice::DecisionNotice { kind, decision } => match decision {
                Decision::Approve => format!("Your {} was approved.", kind).green().to_string(),
                Decision::Deny => format!("Your {} was denied.", kind).red().to_string(),
            },
            Notice::Welcome { member } => format!("Welcome to the den, {}!", member),
            Notice::DirectMessagesClosed { member } => format!(
                "{}, I couldn't DM you. Open your direct messages and try again.",
                member
            ),

            // ==================== Community ====================
            Notice::LevelRoleEarned {
                member,
                level,
                role_name,
            } => format!("{} reached level {} and earned {}!", member, level, role_name.bold()),
            Notice::InteractionPerformed { verb, actor, target } => match verb.category() {
                InteractionCategory::Mood => format!("{} feels {} with {}", actor, verb, target),
                InteractionCategory::Expression => {
                    format!("{} {} at {}", actor, Self::third_person(*verb), target)
                }
                _ => format!("{} {} {}", actor, Self::third_person(*verb), target),
            },
        }
    }

    /// One-line summary of how a proposal or dissolution ended.
    pub fn workflow_outcome(outcome: &WorkflowOutcome) -> String {
        match outcome {
            WorkflowOutcome::Committed(rel) => {
                format!("committed {} {}", rel.kind, rel.id).green().to_string()
            }
            WorkflowOutcome::Dissolved(rel) => format!("dissolved {} {}", rel.kind, rel.id),
            WorkflowOutcome::Declined => "declined".to_string(),
            WorkflowOutcome::TimedOut => "timed out".dimmed().to_string(),
            WorkflowOutcome::Stale(reason) => format!("stale: {}", reason).yellow().to_string(),
            WorkflowOutcome::Superseded => "superseded".dimmed().to_string(),
        }
    }

    pub fn intake_outcome(outcome: &IntakeOutcome) -> String {
        match outcome {
            IntakeOutcome::Queued(submission) => {
                format!("queued {} {}", submission.kind, submission.id)
            }
            IntakeOutcome::Abandoned => "abandoned".dimmed().to_string(),
        }
    }

    pub fn review_outcome(outcome: &ReviewOutcome) -> String {
        match outcome {
            ReviewOutcome::Decided(submission) => format!(
                "{} {}",
                submission
                    .decision()
                    .map(Self::decision_word)
                    .unwrap_or_else(|| "decided".to_string()),
                submission.id
            ),
            ReviewOutcome::AlreadyResolved => "already resolved".dimmed().to_string(),
            ReviewOutcome::CommitFailed { submission, reason } => {
                format!("{} decided but not applied: {}", submission.id, reason)
                    .red()
                    .to_string()
            }
        }
    }

    pub fn error(error: &WorkflowError) -> String {
        if error.is_validation() || error.is_conflict() {
            error.to_string().yellow().to_string()
        } else {
            error.to_string().red().to_string()
        }
    }

    /// Prefix printed in front of a delivered message.
    pub fn message_tag(message: MessageId) -> String {
        format!("[{}]", message).dimmed().to_string()
    }

    fn asks(kind: ProposalKind) -> &'static str {
        match kind {
            ProposalKind::Collar => "offers",
            _ => "asks",
        }
    }

    fn verb_phrase(kind: ProposalKind) -> &'static str {
        match kind {
            ProposalKind::Collar => "a collar",
            _ => "for their paw in marriage",
        }
    }

    fn third_person(verb: InteractionVerb) -> String {
        let base = verb.as_str();
        if base.ends_with("ch") || base.ends_with("sh") {
            format!("{}es", base)
        } else {
            format!("{}s", base)
        }
    }

    fn kind_title(kind: SubmissionKind) -> &'static str {
        match kind {
            SubmissionKind::Verification => "verification",
            SubmissionKind::Profile => "profile",
            SubmissionKind::ProfileImage => "profile image",
        }
    }

    fn decision_word(decision: Decision) -> String {
        match decision {
            Decision::Approve => "Approved".green().to_string(),
            Decision::Deny => "Denied".red().to_string(),
        }
    }

    fn reaction_hint(timeout: Duration) -> String {
        format!(
            "React {} or {} within {}s.",
            ReactionSymbol::Accept,
            ReactionSymbol::Decline,
            timeout.as_secs()
        )
    }
}
