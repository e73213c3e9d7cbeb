//! Wait for one qualifying reaction on a message.

use super::GateOutcome;
use super::dispatcher::{EventDispatcher, Subscription};
use denkeeper_domain::{MessageId, ReactionEvent, ReactionSymbol, UserId};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The reaction that resolved a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateResponse {
    pub responder: UserId,
    pub symbol: ReactionSymbol,
}

type UserPredicate = Box<dyn Fn(UserId) -> bool + Send + Sync>;
type SymbolPredicate = Box<dyn Fn(ReactionSymbol) -> bool + Send + Sync>;

/// What a gate waits for.
pub struct GateRequest {
    message: MessageId,
    responder: UserPredicate,
    symbols: SymbolPredicate,
    timeout: Duration,
}

impl GateRequest {
    /// Any user, any known symbol, on `message`.
    pub fn new(message: MessageId, timeout: Duration) -> Self {
        Self {
            message,
            responder: Box::new(|_| true),
            symbols: Box::new(|_| true),
            timeout,
        }
    }

    /// Only `user` may resolve the gate.
    pub fn from_user(self, user: UserId) -> Self {
        self.responder(move |u| u == user)
    }

    pub fn responder(mut self, predicate: impl Fn(UserId) -> bool + Send + Sync + 'static) -> Self {
        self.responder = Box::new(predicate);
        self
    }

    pub fn symbols(
        mut self,
        predicate: impl Fn(ReactionSymbol) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.symbols = Box::new(predicate);
        self
    }
}

/// Single-shot reaction waits keyed by message.
#[derive(Clone, Default)]
pub struct ReactionGate {
    dispatcher: EventDispatcher<MessageId, ReactionEvent>,
}

impl ReactionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the wait. The gate is live once this returns.
    pub fn open(&self, request: GateRequest) -> PendingReaction {
        let GateRequest {
            message,
            responder,
            symbols,
            timeout,
        } = request;

        let subscription = self.dispatcher.subscribe(message, move |event: &ReactionEvent| {
            responder(event.user) && event.symbol().is_some_and(|s| symbols(s))
        });

        PendingReaction {
            subscription,
            timeout,
        }
    }

    /// Open the gate and wait on it.
    pub async fn wait(
        &self,
        request: GateRequest,
        cancel: &CancellationToken,
    ) -> GateOutcome<GateResponse> {
        self.open(request).wait(cancel).await
    }

    /// Offer a reaction to the gates on its message.
    ///
    /// Returns `true` if a waiting workflow took it.
    pub fn dispatch(&self, event: ReactionEvent) -> bool {
        let message = event.message;
        self.dispatcher.dispatch(&message, event)
    }

    /// Number of open gates.
    pub fn open_gates(&self) -> usize {
        self.dispatcher.len()
    }
}

/// An open reaction gate.
pub struct PendingReaction {
    subscription: Subscription<MessageId, ReactionEvent>,
    timeout: Duration,
}

impl PendingReaction {
    pub fn message(&self) -> MessageId {
        *self.subscription.key()
    }

    pub async fn wait(self, cancel: &CancellationToken) -> GateOutcome<GateResponse> {
        self.subscription
            .wait(self.timeout, cancel)
            .await
            .map(|event| GateResponse {
                responder: event.user,
                symbol: event.symbol().unwrap_or(ReactionSymbol::Decline),
            })
    }
}
