//! Notifier that "posts" to the terminal.
//!
//! Every delivered notice gets a fresh message id so the host can react to
//! it. Members can close their DMs to exercise the unreachable path.

use super::render::ConsoleRenderer;
use async_trait::async_trait;
use colored::Colorize;
use denkeeper_application::{NotificationError, Notice, Notifier, Target};
use denkeeper_domain::{MessageId, UserId};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Default)]
struct Board {
    /// Messages still visible, by id.
    live: BTreeMap<MessageId, Target>,
    closed_dms: HashSet<UserId>,
}

pub struct ConsoleNotifier {
    next_id: AtomicU64,
    board: Mutex<Board>,
    echo: bool,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            board: Mutex::new(Board::default()),
            echo: true,
        }
    }

    /// Keep track of messages without printing them.
    pub fn silent() -> Self {
        Self {
            echo: false,
            ..Self::new()
        }
    }

    /// Open or close a member's direct messages.
    pub fn set_dms_open(&self, user: UserId, open: bool) {
        let mut board = self.board.lock().unwrap_or_else(|e| e.into_inner());
        if open {
            board.closed_dms.remove(&user);
        } else {
            board.closed_dms.insert(user);
        }
    }

    /// Messages delivered and not retracted, oldest first.
    pub fn live_messages(&self) -> Vec<(MessageId, Target)> {
        self.board
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .live
            .iter()
            .map(|(id, target)| (*id, *target))
            .collect()
    }

    fn print(&self, line: String) {
        if self.echo {
            println!("{}", line);
        }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn deliver(&self, target: Target, notice: Notice) -> Result<MessageId, NotificationError> {
        let message = {
            let mut board = self.board.lock().unwrap_or_else(|e| e.into_inner());
            if let Target::Direct(user) = target
                && board.closed_dms.contains(&user)
            {
                return Err(NotificationError::Unreachable(target));
            }
            let message = MessageId(self.next_id.fetch_add(1, Ordering::Relaxed));
            board.live.insert(message, target);
            message
        };

        let target_label = match target {
            Target::Channel(_) => target.to_string().cyan(),
            Target::Direct(_) => target.to_string().magenta(),
        };
        self.print(format!(
            "{} {} {}",
            ConsoleRenderer::message_tag(message),
            target_label,
            ConsoleRenderer::notice(&notice)
        ));
        Ok(message)
    }

    async fn retract(&self, target: Target, message: MessageId) -> Result<(), NotificationError> {
        let removed = self
            .board
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .live
            .remove(&message);
        if removed.is_some() {
            self.print(format!(
                "{} {}",
                ConsoleRenderer::message_tag(message),
                format!("deleted from {}", target).dimmed()
            ));
        } else {
            debug!("{} in {} was already gone", message, target);
        }
        Ok(())
    }
}
