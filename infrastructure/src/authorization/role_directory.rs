//! Role directory authorizer.
//!
//! Capabilities are resolved through the `[roles]` mapping: a member holds
//! a capability when they hold the role configured for it. Capabilities
//! with no mapped role are held by nobody.

use async_trait::async_trait;
use denkeeper_application::ports::authorization::{AuthorizationError, Authorizer};
use denkeeper_domain::{Capability, RoleId, UserId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use tracing::debug;

pub struct RoleDirectory {
    capability_roles: BTreeMap<Capability, RoleId>,
    members: Mutex<HashMap<UserId, BTreeSet<RoleId>>>,
}

impl RoleDirectory {
    pub fn new(capability_roles: BTreeMap<Capability, RoleId>) -> Self {
        Self {
            capability_roles,
            members: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a member with roles (builder form of [`assign`](Self::assign)).
    pub fn with_member(self, user: UserId, roles: impl IntoIterator<Item = RoleId>) -> Self {
        for role in roles {
            self.assign(user, role);
        }
        self
    }

    /// Role backing a capability, if one is configured.
    pub fn role_for(&self, capability: Capability) -> Option<RoleId> {
        self.capability_roles.get(&capability).copied()
    }

    /// Give a member a role directly (used for manual grants).
    pub fn assign(&self, user: UserId, role: RoleId) -> bool {
        self.members
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(user)
            .or_default()
            .insert(role)
    }

    /// Give a member the role backing `capability`.
    pub fn assign_capability(
        &self,
        user: UserId,
        capability: Capability,
    ) -> Result<bool, AuthorizationError> {
        let role = self
            .role_for(capability)
            .ok_or(AuthorizationError::UnmappedCapability(capability))?;
        Ok(self.assign(user, role))
    }

    /// Capabilities `user` currently holds.
    pub fn capabilities_of(&self, user: UserId) -> Vec<Capability> {
        let members = self.members.lock().unwrap_or_else(|e| e.into_inner());
        let Some(roles) = members.get(&user) else {
            return Vec::new();
        };
        self.capability_roles
            .iter()
            .filter(|(_, role)| roles.contains(role))
            .map(|(capability, _)| *capability)
            .collect()
    }

    fn held_roles(&self, user: UserId) -> BTreeSet<RoleId> {
        self.members
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Authorizer for RoleDirectory {
    fn has_capability(&self, subject: UserId, capability: Capability) -> bool {
        let Some(role) = self.role_for(capability) else {
            return false;
        };
        self.members
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&subject)
            .is_some_and(|roles| roles.contains(&role))
    }

    async fn grant_capability(
        &self,
        subject: UserId,
        capability: Capability,
    ) -> Result<(), AuthorizationError> {
        if self.assign_capability(subject, capability)? {
            debug!("Granted {} to {}", capability, subject);
        }
        Ok(())
    }

    async fn roles_of(&self, subject: UserId) -> Result<BTreeSet<RoleId>, AuthorizationError> {
        Ok(self.held_roles(subject))
    }

    async fn add_role(&self, subject: UserId, role: RoleId) -> Result<(), AuthorizationError> {
        self.assign(subject, role);
        Ok(())
    }

    async fn remove_role(&self, subject: UserId, role: RoleId) -> Result<(), AuthorizationError> {
        let mut members = self.members.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(roles) = members.get_mut(&subject) {
            roles.remove(&role);
            if roles.is_empty() {
                members.remove(&subject);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADULT: RoleId = RoleId(100);
    const MODERATOR: RoleId = RoleId(101);

    fn directory() -> RoleDirectory {
        RoleDirectory::new(BTreeMap::from([
            (Capability::Adult, ADULT),
            (Capability::Moderator, MODERATOR),
        ]))
    }

    #[test]
    fn test_capability_follows_mapped_role() {
        let dir = directory().with_member(UserId(1), [ADULT]);

        assert!(dir.has_capability(UserId(1), Capability::Adult));
        assert!(!dir.has_capability(UserId(1), Capability::Moderator));
        assert!(!dir.has_capability(UserId(2), Capability::Adult));
        assert_eq!(dir.capabilities_of(UserId(1)), vec![Capability::Adult]);
    }

    #[test]
    fn test_unmapped_capability_is_held_by_nobody() {
        let dir = directory().with_member(UserId(1), [ADULT, MODERATOR, RoleId(999)]);
        assert!(!dir.has_capability(UserId(1), Capability::Verified));
    }

    #[tokio::test]
    async fn test_grant_capability() {
        let dir = directory();

        dir.grant_capability(UserId(3), Capability::Moderator)
            .await
            .unwrap();
        assert!(dir.has_capability(UserId(3), Capability::Moderator));

        let err = dir
            .grant_capability(UserId(3), Capability::Verified)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthorizationError::UnmappedCapability(Capability::Verified)
        ));
    }

    #[tokio::test]
    async fn test_add_and_remove_roles() {
        let dir = directory();
        let reward = RoleId(205);

        dir.add_role(UserId(1), reward).await.unwrap();
        dir.add_role(UserId(1), ADULT).await.unwrap();
        assert_eq!(
            dir.roles_of(UserId(1)).await.unwrap(),
            BTreeSet::from([ADULT, reward])
        );

        dir.remove_role(UserId(1), reward).await.unwrap();
        dir.remove_role(UserId(1), reward).await.unwrap();
        assert_eq!(dir.roles_of(UserId(1)).await.unwrap(), BTreeSet::from([ADULT]));
        assert!(dir.roles_of(UserId(7)).await.unwrap().is_empty());
    }
}
