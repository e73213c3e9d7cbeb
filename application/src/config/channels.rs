//! Where workflows post their messages.

use denkeeper_domain::ChannelId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMap {
    /// Moderator channel receiving review requests.
    pub review: ChannelId,
    /// Moderator log of decisions.
    pub log: ChannelId,
    /// Public channel where verification starts; closed-DM notices land here.
    pub verification: ChannelId,
    /// Welcome post for newly verified members.
    pub welcome: Option<ChannelId>,
    /// Level-up and reward announcements.
    pub level_up: Option<ChannelId>,
    /// Channel where proposals and interactions are announced.
    pub general: ChannelId,
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self {
            review: ChannelId(10),
            log: ChannelId(11),
            verification: ChannelId(12),
            welcome: Some(ChannelId(13)),
            level_up: Some(ChannelId(14)),
            general: ChannelId(1),
        }
    }
}
