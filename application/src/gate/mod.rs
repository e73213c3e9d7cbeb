//! Single-shot "wait for one qualifying event or time out" primitives.
//!
//! - [`EventDispatcher`]: keyed dispatch table the event loop feeds
//! - [`ReactionGate`]: waits keyed by message, resolved by reactions
//! - [`ReplyGate`]: waits keyed by author, resolved by direct messages

pub mod dispatcher;
pub mod reaction;
pub mod reply;

pub use dispatcher::{EventDispatcher, Subscription};
pub use reaction::{GateRequest, GateResponse, PendingReaction, ReactionGate};
pub use reply::ReplyGate;

/// How a gate wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome<T> {
    Responded(T),
    TimedOut,
    /// The wait was torn down by its cancellation token.
    Cancelled,
}

impl<T> GateOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GateOutcome<U> {
        match self {
            GateOutcome::Responded(value) => GateOutcome::Responded(f(value)),
            GateOutcome::TimedOut => GateOutcome::TimedOut,
            GateOutcome::Cancelled => GateOutcome::Cancelled,
        }
    }
}
