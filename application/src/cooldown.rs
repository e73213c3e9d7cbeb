//! Per-member rate limiting.
//!
//! [`CooldownTracker`] keeps one window start per (member, action). A new
//! action inside the window is rejected with the remaining time; recording
//! an action resets the window start (absolute reset, not a sliding log).
//! Expired entries are dropped when checked, and in bulk by
//! [`purge_expired`](CooldownTracker::purge_expired).

use crate::config::CooldownPolicy;
use denkeeper_domain::{InteractionVerb, UserId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownAction {
    Propose,
    Interaction(InteractionVerb),
    VerificationResubmit,
}

impl fmt::Display for CooldownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CooldownAction::Propose => write!(f, "propose"),
            CooldownAction::Interaction(verb) => write!(f, "{}", verb),
            CooldownAction::VerificationResubmit => write!(f, "verification"),
        }
    }
}

pub struct CooldownTracker {
    policy: CooldownPolicy,
    windows: Mutex<HashMap<(UserId, CooldownAction), Instant>>,
}

impl CooldownTracker {
    pub fn new(policy: CooldownPolicy) -> Self {
        Self {
            policy,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &CooldownPolicy {
        &self.policy
    }

    /// Remaining cooldown right now; zero when the action is allowed.
    pub fn check(&self, subject: UserId, action: CooldownAction) -> Duration {
        self.check_at(subject, action, Instant::now())
    }

    /// Remaining cooldown at `now`; zero when the action is allowed.
    pub fn check_at(&self, subject: UserId, action: CooldownAction, now: Instant) -> Duration {
        let window = self.policy.window(action);
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        let Some(start) = windows.get(&(subject, action)).copied() else {
            return Duration::ZERO;
        };

        let ends = start + window;
        if now < ends {
            ends - now
        } else {
            windows.remove(&(subject, action));
            Duration::ZERO
        }
    }

    /// Start a new window for (subject, action) at `now`.
    pub fn record(&self, subject: UserId, action: CooldownAction, now: Instant) {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        windows.insert((subject, action), now);
    }

    /// Drop every window that has ended at `now`. Returns how many went.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let before = windows.len();
        windows.retain(|(_, action), start| now < *start + self.policy.window(*action));
        before - windows.len()
    }

    /// Number of tracked windows, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.windows.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
