//! Wait for one qualifying message from a user.
//!
//! Used for questionnaire answers and image uploads sent over DM. Listeners
//! are keyed by member alone; the approval queue allows each member one
//! open questionnaire.

use super::GateOutcome;
use super::dispatcher::EventDispatcher;
use denkeeper_domain::{ReplyEvent, UserId};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Clone, Default)]
pub struct ReplyGate {
    dispatcher: EventDispatcher<UserId, ReplyEvent>,
}

impl ReplyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the next direct message from `author` accepted by `filter`.
    pub async fn wait_for(
        &self,
        author: UserId,
        filter: impl Fn(&ReplyEvent) -> bool + Send + Sync + 'static,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> GateOutcome<ReplyEvent> {
        self.dispatcher
            .subscribe(author, move |reply: &ReplyEvent| {
                reply.channel.is_none() && filter(reply)
            })
            .wait(timeout, cancel)
            .await
    }

    /// Wait for any direct-message text from `author`.
    pub async fn wait_for_text(
        &self,
        author: UserId,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> GateOutcome<ReplyEvent> {
        self.wait_for(author, |reply| !reply.content.trim().is_empty(), timeout, cancel)
            .await
    }

    /// Wait for a direct message from `author` carrying an attachment.
    pub async fn wait_for_attachment(
        &self,
        author: UserId,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> GateOutcome<ReplyEvent> {
        self.wait_for(author, |reply| !reply.attachments.is_empty(), timeout, cancel)
            .await
    }

    /// Returns `true` if a waiting workflow took the reply.
    pub fn dispatch(&self, reply: ReplyEvent) -> bool {
        let author = reply.author;
        self.dispatcher.dispatch(&author, reply)
    }

    /// Whether a workflow is waiting on `author`.
    pub fn is_waiting_on(&self, author: UserId) -> bool {
        self.dispatcher.listeners_on(&author) > 0
    }
}
