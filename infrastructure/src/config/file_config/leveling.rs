//! Level-role rewards from TOML (`[[leveling.rewards]]` tables)
//!
//! ```toml
//! [[leveling.rewards]]
//! level = 5
//! role = 900205
//! name = "Pup"
//!
//! [[leveling.rewards]]
//! level = 10
//! role = 900210
//! name = "Gallery Access"
//! cumulative = true
//! ```

use denkeeper_domain::{LevelLadder, LevelReward};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLevelingConfig {
    pub rewards: Vec<LevelReward>,
}

impl FileLevelingConfig {
    pub fn to_ladder(&self) -> LevelLadder {
        LevelLadder::new(self.rewards.clone())
    }

    /// Levels that appear on more than one reward, in ascending order.
    pub fn duplicate_levels(&self) -> Vec<u32> {
        let mut seen = HashSet::new();
        let mut duplicates: Vec<u32> = self
            .rewards
            .iter()
            .map(|r| r.level)
            .filter(|level| !seen.insert(*level))
            .collect();
        duplicates.sort_unstable();
        duplicates.dedup();
        duplicates
    }
}
