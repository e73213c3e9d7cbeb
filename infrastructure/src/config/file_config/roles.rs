//! Capability-to-role mapping from TOML (`[roles]` section)
//!
//! Workflows ask about capabilities; the platform knows roles. Each
//! capability is held by members carrying the mapped role.
//!
//! ```toml
//! [roles]
//! adult = 900100
//! moderator = 900101
//! verified = 900102
//! ```

use denkeeper_domain::{Capability, RoleId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRolesConfig {
    pub adult: Option<u64>,
    pub moderator: Option<u64>,
    pub verified: Option<u64>,
}

impl FileRolesConfig {
    pub fn role_for(&self, capability: Capability) -> Option<RoleId> {
        let raw = match capability {
            Capability::Adult => self.adult,
            Capability::Moderator => self.moderator,
            Capability::Verified => self.verified,
        };
        raw.map(RoleId)
    }

    /// Every mapped capability.
    pub fn capability_roles(&self) -> BTreeMap<Capability, RoleId> {
        Capability::ALL
            .into_iter()
            .filter_map(|c| self.role_for(c).map(|role| (c, role)))
            .collect()
    }

    /// Capabilities with no role configured.
    pub fn unmapped(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.role_for(*c).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_roles() {
        let roles = FileRolesConfig {
            adult: Some(1),
            moderator: None,
            verified: Some(3),
        };
        let map = roles.capability_roles();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&Capability::Verified], RoleId(3));
        assert_eq!(roles.unmapped(), vec![Capability::Moderator]);
    }
}
