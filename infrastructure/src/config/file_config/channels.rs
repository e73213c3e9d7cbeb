//! Channel ids from TOML (`[channels]` section)
//!
//! ```toml
//! [channels]
//! general = 1
//! review = 10
//! log = 11
//! verification = 12
//! welcome = 13       # optional
//! level_up = 14      # optional
//! ```

use denkeeper_application::ChannelMap;
use denkeeper_domain::ChannelId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChannelsConfig {
    pub general: u64,
    pub review: u64,
    pub log: u64,
    pub verification: u64,
    pub welcome: Option<u64>,
    pub level_up: Option<u64>,
}

impl Default for FileChannelsConfig {
    fn default() -> Self {
        let map = ChannelMap::default();
        Self {
            general: map.general.get(),
            review: map.review.get(),
            log: map.log.get(),
            verification: map.verification.get(),
            welcome: map.welcome.map(|c| c.get()),
            level_up: map.level_up.map(|c| c.get()),
        }
    }
}

impl FileChannelsConfig {
    pub fn to_channel_map(&self) -> ChannelMap {
        ChannelMap {
            review: ChannelId(self.review),
            log: ChannelId(self.log),
            verification: ChannelId(self.verification),
            welcome: self.welcome.map(ChannelId),
            level_up: self.level_up.map(ChannelId),
            general: ChannelId(self.general),
        }
    }
}
